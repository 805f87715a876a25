// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router construction.

use std::sync::Arc;

use axum::{
	routing::{get, post},
	Router,
};
use wheel_server_auth::{
	AuthMiddleware, GatewayAuthorizer, IdentityProvider, MemoryDirectory, UserDirectory,
};
use wheel_server_config::ServerConfig;

use crate::error::ServerError;
use crate::routes;

pub const HEALTH_PATH: &str = "/health";
pub const AUTHORIZE_PATH: &str = "/authorize";
pub const PERMISSIONS_PATH: &str = "/app/api/v2/auth/permissions";

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
	pub middleware: Arc<AuthMiddleware>,
	pub authorizer: Arc<GatewayAuthorizer>,
}

impl AppState {
	/// Wire both authorization entry points to the same provider and directory.
	pub fn new(
		provider: Option<IdentityProvider>,
		directory: Arc<dyn UserDirectory>,
		self_identity_path: impl Into<String>,
	) -> Self {
		let middleware = AuthMiddleware::new(provider.clone(), directory.clone())
			.with_self_identity_path(self_identity_path);
		Self {
			middleware: Arc::new(middleware),
			authorizer: Arc::new(GatewayAuthorizer::new(provider, directory)),
		}
	}

	pub fn is_configured(&self) -> bool {
		self.authorizer.is_configured()
	}
}

/// Build application state from resolved configuration.
pub fn create_app_state(config: &ServerConfig) -> Result<AppState, ServerError> {
	let provider = config.cognito.as_ref().and_then(|cognito| {
		IdentityProvider::from_optional(
			Some(cognito.user_pool_id.as_str()),
			Some(cognito.client_id.as_str()),
			cognito.region.as_deref(),
		)
	});

	let directory = match &config.directory.seed_path {
		Some(path) => MemoryDirectory::from_seed_file(path)?,
		None => MemoryDirectory::new(),
	};
	tracing::info!(users = directory.user_count(), "user directory ready");

	let self_identity_path = &config.auth.self_identity_path;
	if [HEALTH_PATH, AUTHORIZE_PATH, PERMISSIONS_PATH].contains(&self_identity_path.as_str()) {
		return Err(ServerError::RouteConflict(self_identity_path.clone()));
	}

	Ok(AppState::new(
		provider,
		Arc::new(directory),
		self_identity_path.clone(),
	))
}

pub fn create_router(state: AppState) -> Router {
	let self_identity_path = state.middleware.self_identity_path().to_string();

	Router::new()
		.route(HEALTH_PATH, get(routes::health::health_check))
		.route(AUTHORIZE_PATH, post(routes::authorize::authorize))
		.route(&self_identity_path, get(routes::identity::whoami))
		.route(PERMISSIONS_PATH, get(routes::identity::permissions))
		.with_state(state)
}
