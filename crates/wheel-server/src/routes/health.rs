// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health check endpoint.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use crate::api::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: &'static str,
	pub version: &'static str,
	pub identity_provider_configured: bool,
}

/// Liveness plus whether an identity provider is configured. An unconfigured
/// server is healthy but denies every request.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	Json(HealthResponse {
		status: "ok",
		version: env!("CARGO_PKG_VERSION"),
		identity_provider_configured: state.is_configured(),
	})
}
