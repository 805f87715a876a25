// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Custom authorizer endpoint.
//!
//! Accepts a gateway TOKEN event and answers with an IAM policy. Every
//! failure yields a Deny policy with status 200.

use axum::{
	body::Bytes,
	extract::State,
	Json,
};
use wheel_server_auth::{authorizer::deny, AuthorizerEvent, AuthorizerResponse};

use crate::api::AppState;

pub async fn authorize(State(state): State<AppState>, body: Bytes) -> Json<AuthorizerResponse> {
	let event: AuthorizerEvent = match serde_json::from_slice(&body) {
		Ok(event) => event,
		Err(e) => {
			tracing::info!(error = %e, "malformed authorizer event");
			return Json(deny(""));
		}
	};

	Json(state.authorizer.authorize(&event).await)
}
