// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error types.

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use wheel_server_auth::{ApiResponse, DirectoryError};

use crate::proxy;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("failed to load user directory: {0}")]
	Directory(#[from] DirectoryError),

	#[error("self-identity path {0} collides with a built-in route")]
	RouteConflict(String),

	#[error("invalid request: {0}")]
	BadRequest(String),
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let response = match &self {
			ServerError::BadRequest(message) => ApiResponse::error(StatusCode::BAD_REQUEST, message),
			_ => {
				tracing::error!(error = %self, "internal server error");
				ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
			}
		};
		proxy::into_http(response)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bad_request_is_400() {
		let response = ServerError::BadRequest("body too large".to_string()).into_response();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	}

	#[test]
	fn directory_failure_is_500() {
		let error = ServerError::from(DirectoryError::Storage("seed unreadable".to_string()));
		assert!(error.to_string().starts_with("failed to load user directory"));
		assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}
