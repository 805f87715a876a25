// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Caller identity endpoints.
//!
//! Both run behind the [`Authenticate`] gate. The self-identity route is the
//! one path where a caller without a directory record still gets a context.

use std::convert::Infallible;

use axum::{
	extract::{Request, State},
	response::Response,
};
use http::StatusCode;
use serde_json::json;
use tower::{service_fn, Layer};
use wheel_server_auth::{middleware::AUTHENTICATION_FAILED, ApiRequest, ApiResponse, Authenticate};

use crate::api::AppState;
use crate::proxy;

/// `GET <self identity path>`: the caller's user info and full context.
pub async fn whoami(State(state): State<AppState>, request: Request) -> Response {
	let service = Authenticate::new(state.middleware.clone()).layer(service_fn(whoami_handler));
	proxy::dispatch(service, request).await
}

/// `GET /app/api/v2/auth/permissions`: the caller's role and granted permissions.
pub async fn permissions(State(state): State<AppState>, request: Request) -> Response {
	let service =
		Authenticate::new(state.middleware.clone()).layer(service_fn(permissions_handler));
	proxy::dispatch(service, request).await
}

async fn whoami_handler(request: ApiRequest) -> Result<ApiResponse, Infallible> {
	let (Some(user), Some(context)) = (&request.user_info, request.context()) else {
		return Ok(ApiResponse::unauthorized(AUTHENTICATION_FAILED));
	};

	Ok(ApiResponse::json(
		StatusCode::OK,
		&json!({
			"user": user,
			"wheel_group_context": context,
		}),
	))
}

async fn permissions_handler(request: ApiRequest) -> Result<ApiResponse, Infallible> {
	let Some(context) = request.context() else {
		return Ok(ApiResponse::unauthorized(AUTHENTICATION_FAILED));
	};

	Ok(ApiResponse::json(
		StatusCode::OK,
		&json!({
			"role": context.role(),
			"wheel_group_id": context.wheel_group_id(),
			"deployment_admin": context.is_deployment_admin(),
			"permissions": context.permissions().granted_names(),
		}),
	))
}
