// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tower layers that gate a handler on authentication or a named permission.
//!
//! - [`Authenticate`] runs the [`AuthMiddleware`] and hands the authenticated
//!   request to the inner service, or returns the middleware's 401.
//! - [`RequirePermission`] does the same, then returns 403 unless the attached
//!   context grants the permission.
//!
//! The gates never special-case deployment admins: they pass because their
//! permission set holds every permission.
//!
//! # Example
//!
//! ```ignore
//! use tower::{service_fn, ServiceBuilder};
//!
//! let delete_wheel = ServiceBuilder::new()
//!     .layer(RequirePermission::new(middleware.clone(), "delete_wheel"))
//!     .service(service_fn(delete_wheel_handler));
//! ```

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use http::StatusCode;
use serde_json::json;
use tower::{Layer, Service};

use crate::context::AuthorizationContext;
use crate::middleware::{AuthMiddleware, AUTHENTICATION_FAILED};
use crate::request::{ApiRequest, ApiResponse};

// =============================================================================
// Authenticate
// =============================================================================

/// Layer that admits any authenticated caller.
#[derive(Clone)]
pub struct Authenticate {
	middleware: Arc<AuthMiddleware>,
}

impl Authenticate {
	pub fn new(middleware: Arc<AuthMiddleware>) -> Self {
		Self { middleware }
	}
}

impl<S> Layer<S> for Authenticate {
	type Service = AuthenticateService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		AuthenticateService {
			inner,
			middleware: self.middleware.clone(),
		}
	}
}

#[derive(Clone)]
pub struct AuthenticateService<S> {
	inner: S,
	middleware: Arc<AuthMiddleware>,
}

impl<S> Service<ApiRequest> for AuthenticateService<S>
where
	S: Service<ApiRequest, Response = ApiResponse> + Clone + Send + 'static,
	S::Future: Send,
{
	type Response = ApiResponse;
	type Error = S::Error;
	type Future = BoxFuture<'static, Result<ApiResponse, S::Error>>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, request: ApiRequest) -> Self::Future {
		let middleware = self.middleware.clone();
		let clone = self.inner.clone();
		let mut inner = std::mem::replace(&mut self.inner, clone);

		Box::pin(async move {
			match middleware.authenticate(request).await {
				Ok(request) => inner.call(request).await,
				Err(response) => Ok(response),
			}
		})
	}
}

// =============================================================================
// RequirePermission
// =============================================================================

/// Layer that admits callers whose context grants `permission`.
#[derive(Clone)]
pub struct RequirePermission {
	middleware: Arc<AuthMiddleware>,
	permission: Arc<str>,
}

impl RequirePermission {
	pub fn new(middleware: Arc<AuthMiddleware>, permission: &str) -> Self {
		Self {
			middleware,
			permission: Arc::from(permission),
		}
	}

	pub fn permission(&self) -> &str {
		&self.permission
	}
}

impl<S> Layer<S> for RequirePermission {
	type Service = RequirePermissionService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RequirePermissionService {
			inner,
			middleware: self.middleware.clone(),
			permission: self.permission.clone(),
		}
	}
}

#[derive(Clone)]
pub struct RequirePermissionService<S> {
	inner: S,
	middleware: Arc<AuthMiddleware>,
	permission: Arc<str>,
}

impl<S> Service<ApiRequest> for RequirePermissionService<S>
where
	S: Service<ApiRequest, Response = ApiResponse> + Clone + Send + 'static,
	S::Future: Send,
{
	type Response = ApiResponse;
	type Error = S::Error;
	type Future = BoxFuture<'static, Result<ApiResponse, S::Error>>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, request: ApiRequest) -> Self::Future {
		let middleware = self.middleware.clone();
		let permission = self.permission.clone();
		let clone = self.inner.clone();
		let mut inner = std::mem::replace(&mut self.inner, clone);

		Box::pin(async move {
			let request = match middleware.authenticate(request).await {
				Ok(request) => request,
				Err(response) => return Ok(response),
			};

			let Some(context) = request.context() else {
				return Ok(ApiResponse::unauthorized(AUTHENTICATION_FAILED));
			};

			if !context.has_permission(&permission) {
				tracing::info!(
					user_id = %context.user_id(),
					role = %context.role(),
					permission = %permission,
					"permission denied"
				);
				return Ok(permission_denied(&permission, context));
			}

			tracing::debug!(
				user_id = %context.user_id(),
				permission = %permission,
				"permission granted"
			);
			inner.call(request).await
		})
	}
}

/// 403 naming the required permission and echoing the caller's permission map.
pub fn permission_denied(permission: &str, context: &AuthorizationContext) -> ApiResponse {
	ApiResponse::json(
		StatusCode::FORBIDDEN,
		&json!({
			"error": format!("Permission denied: {permission} required"),
			"required_permission": permission,
			"user_permissions": context.permissions(),
		}),
	)
}
