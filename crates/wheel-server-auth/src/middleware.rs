// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-process request authentication.
//!
//! ```text
//! ApiRequest → bearer token → decode → validate → Identity
//!                                                   │
//!                          deployment admin ────────┤──── skip lookup
//!                                                   │
//!                          directory lookup ────────┴──── UserNotFound:
//!                                                          self-identity path → USER context
//!                                                          other paths        → 401
//! ```
//!
//! On success the request comes back with `wheel_group_context` and
//! `user_info` attached. Every failure is a 401 [`ApiResponse`]; client-facing
//! messages are deliberately coarse.
//!
//! # Security Notes
//!
//! - Bearer tokens are never logged
//! - Only the `Authorization` and `authorization` header names are read

use std::collections::HashMap;
use std::sync::Arc;

use tracing::instrument;

use crate::context::{build_context, AuthorizationContext};
use crate::directory::UserDirectory;
use crate::error::AuthError;
use crate::identity::Identity;
use crate::request::{ApiRequest, ApiResponse, UserInfo};
use crate::validation::IdentityProvider;

/// Path of the "who am I" endpoint that admits unprovisioned callers.
pub const DEFAULT_SELF_IDENTITY_PATH: &str = "/app/api/v2/auth/me";

/// Header names checked for the bearer token, in order.
pub const AUTHORIZATION_HEADERS: [&str; 2] = ["Authorization", "authorization"];

pub const MISSING_AUTH_HEADER: &str = "Missing or invalid Authorization header";
pub const AUTHENTICATION_FAILED: &str = "Authentication failed";
pub const MISSING_CLAIMS: &str = "Token missing required claims";
pub const NO_WHEEL_GROUP: &str = "User not associated with any wheel group";

/// Extract the bearer token from a proxy header map.
///
/// Returns `None` if neither header name is present or the value does not
/// start with `Bearer `.
pub fn extract_bearer_token(headers: &HashMap<String, String>) -> Option<&str> {
	AUTHORIZATION_HEADERS
		.iter()
		.find_map(|name| headers.get(*name))
		.and_then(|value| value.strip_prefix("Bearer "))
}

#[derive(Clone)]
pub struct AuthMiddleware {
	provider: Option<IdentityProvider>,
	directory: Arc<dyn UserDirectory>,
	self_identity_path: String,
}

impl AuthMiddleware {
	pub fn new(provider: Option<IdentityProvider>, directory: Arc<dyn UserDirectory>) -> Self {
		Self {
			provider,
			directory,
			self_identity_path: DEFAULT_SELF_IDENTITY_PATH.to_string(),
		}
	}

	pub fn with_self_identity_path(mut self, path: impl Into<String>) -> Self {
		self.self_identity_path = path.into();
		self
	}

	pub fn self_identity_path(&self) -> &str {
		&self.self_identity_path
	}

	pub fn is_configured(&self) -> bool {
		self.provider.is_some()
	}

	/// Authenticate `request` and attach its authorization context.
	///
	/// # Errors
	///
	/// Returns a 401 [`ApiResponse`] with one of [`MISSING_AUTH_HEADER`],
	/// [`AUTHENTICATION_FAILED`], [`MISSING_CLAIMS`] or [`NO_WHEEL_GROUP`].
	#[instrument(skip_all, fields(path = %request.path, user_id = tracing::field::Empty))]
	pub async fn authenticate(&self, mut request: ApiRequest) -> Result<ApiRequest, ApiResponse> {
		let Some(token) = extract_bearer_token(&request.headers) else {
			tracing::info!("missing or invalid authorization header");
			return Err(ApiResponse::unauthorized(MISSING_AUTH_HEADER));
		};

		let identity = match Identity::from_token(token, self.provider.as_ref()) {
			Ok(identity) => identity,
			Err(AuthError::MissingIdentityClaims) => {
				tracing::info!("token missing identity claims");
				return Err(ApiResponse::unauthorized(MISSING_CLAIMS));
			}
			Err(e) => {
				tracing::info!(reason = %e, "token rejected");
				return Err(ApiResponse::unauthorized(AUTHENTICATION_FAILED));
			}
		};
		tracing::Span::current().record("user_id", identity.subject_id.as_str());

		let context = match build_context(&identity, self.directory.as_ref()).await {
			Ok(context) => context,
			Err(AuthError::UserNotFound(_)) if request.path == self.self_identity_path => {
				tracing::debug!(email = %identity.email, "unprovisioned caller on self-identity path");
				AuthorizationContext::unprovisioned(&identity)
			}
			Err(AuthError::UserNotFound(_)) => {
				tracing::info!(email = %identity.email, "caller has no wheel group");
				return Err(ApiResponse::unauthorized(NO_WHEEL_GROUP));
			}
			Err(e) => {
				tracing::info!(email = %identity.email, reason = %e, "authorization context unavailable");
				return Err(ApiResponse::unauthorized(AUTHENTICATION_FAILED));
			}
		};

		tracing::debug!(
			role = %context.role(),
			deployment_admin = context.is_deployment_admin(),
			"request authenticated"
		);
		request.user_info = Some(UserInfo::from(&context));
		request.wheel_group_context = Some(context);
		Ok(request)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::claims::Claims;
	use crate::directory::MemoryDirectory;
	use crate::testing::{
		bearer, deployment_admin_claims, expired_claims, test_provider, user_record, valid_claims,
		FailingDirectory, UnreachableDirectory,
	};
	use crate::types::Role;
	use serde_json::json;

	fn directory() -> Arc<dyn UserDirectory> {
		Arc::new(
			MemoryDirectory::new()
				.with_user(user_record("u-42", "a@x.com", "wg-1", "WHEEL_ADMIN"))
				.with_wheel_group("wg-1", "Wheel Group One"),
		)
	}

	fn middleware() -> AuthMiddleware {
		AuthMiddleware::new(Some(test_provider()), directory())
	}

	fn request(path: &str, claims: &Claims) -> ApiRequest {
		ApiRequest::new("GET", path).with_header("Authorization", bearer(claims))
	}

	fn error_message(response: &ApiResponse) -> String {
		response.body_json()["error"].as_str().unwrap_or_default().to_string()
	}

	mod header {
		use super::*;

		#[test]
		fn reads_both_supported_casings() {
			for name in AUTHORIZATION_HEADERS {
				let headers = HashMap::from([(name.to_string(), "Bearer t0k".to_string())]);
				assert_eq!(extract_bearer_token(&headers), Some("t0k"));
			}
		}

		#[test]
		fn ignores_other_casings() {
			let headers = HashMap::from([("AUTHORIZATION".to_string(), "Bearer t0k".to_string())]);
			assert_eq!(extract_bearer_token(&headers), None);
		}

		#[test]
		fn requires_bearer_scheme() {
			let headers = HashMap::from([("Authorization".to_string(), "Basic dXNlcg==".to_string())]);
			assert_eq!(extract_bearer_token(&headers), None);
			let headers = HashMap::from([("Authorization".to_string(), "bearer t0k".to_string())]);
			assert_eq!(extract_bearer_token(&headers), None);
		}

		#[tokio::test]
		async fn all_caps_header_is_rejected() {
			let request = ApiRequest::new("GET", "/app/api/v2/wheels")
				.with_header("AUTHORIZATION", bearer(&valid_claims("s", "a@x.com")));
			let response = middleware().authenticate(request).await.unwrap_err();
			assert_eq!(response.status_code, 401);
			assert_eq!(error_message(&response), MISSING_AUTH_HEADER);
		}

		#[tokio::test]
		async fn lowercase_header_is_accepted() {
			let request = ApiRequest::new("GET", "/app/api/v2/wheels")
				.with_header("authorization", bearer(&valid_claims("s", "a@x.com")));
			assert!(middleware().authenticate(request).await.is_ok());
		}
	}

	mod success {
		use super::*;

		#[tokio::test]
		async fn attaches_member_context() {
			let request = middleware()
				.authenticate(request("/app/api/v2/wheels", &valid_claims("s1", "a@x.com")))
				.await
				.unwrap();

			let context = request.context().unwrap();
			assert_eq!(context.role(), Role::WheelAdmin);
			assert_eq!(context.wheel_group_id().unwrap().as_str(), "wg-1");
			assert!(context.has_permission("create_wheel"));
			assert!(!context.has_permission("manage_users"));

			let user_info = request.user_info.unwrap();
			assert_eq!(user_info.user_id.as_str(), "u-42");
			assert!(!user_info.deployment_admin);
		}

		#[tokio::test]
		async fn deployment_admin_skips_lookup() {
			let middleware = AuthMiddleware::new(Some(test_provider()), Arc::new(UnreachableDirectory));
			let request = middleware
				.authenticate(request("/app/api/v2/wheel-groups", &deployment_admin_claims("u1", "a@x.com")))
				.await
				.unwrap();

			let context = request.context().unwrap();
			assert_eq!(context.role(), Role::DeploymentAdmin);
			assert!(context.wheel_group_id().is_none());
			assert!(request.user_info.unwrap().deployment_admin);
		}

		#[tokio::test]
		async fn serialized_request_carries_context() {
			let request = middleware()
				.authenticate(request("/app/api/v2/wheels", &valid_claims("s1", "a@x.com")))
				.await
				.unwrap();
			let value = serde_json::to_value(&request).unwrap();
			assert_eq!(value["wheel_group_context"]["role"], json!("WHEEL_ADMIN"));
			assert_eq!(value["wheel_group_context"]["permissions"]["rig_wheel"], json!(true));
			assert_eq!(value["user_info"]["email"], json!("a@x.com"));
		}
	}

	mod unprovisioned {
		use super::*;

		#[tokio::test]
		async fn self_identity_path_gets_user_context() {
			let request = middleware()
				.authenticate(request(DEFAULT_SELF_IDENTITY_PATH, &valid_claims("s9", "new@x.com")))
				.await
				.unwrap();

			let context = request.context().unwrap();
			assert_eq!(context.role(), Role::User);
			assert!(context.wheel_group_id().is_none());
			assert_eq!(context.user_id().as_str(), "s9");
			assert!(context.has_permission("view_wheels"));
			assert!(!context.has_permission("create_wheel"));
		}

		#[tokio::test]
		async fn other_paths_are_rejected() {
			let response = middleware()
				.authenticate(request("/app/api/v2/wheels", &valid_claims("s9", "new@x.com")))
				.await
				.unwrap_err();
			assert_eq!(response.status_code, 401);
			assert_eq!(error_message(&response), NO_WHEEL_GROUP);
		}

		#[tokio::test]
		async fn custom_self_identity_path() {
			let middleware = middleware().with_self_identity_path("/whoami");
			assert!(middleware
				.authenticate(request("/whoami", &valid_claims("s9", "new@x.com")))
				.await
				.is_ok());
			assert!(middleware
				.authenticate(request(DEFAULT_SELF_IDENTITY_PATH, &valid_claims("s9", "new@x.com")))
				.await
				.is_err());
		}
	}

	mod failures {
		use super::*;

		#[tokio::test]
		async fn missing_header() {
			let response = middleware()
				.authenticate(ApiRequest::new("GET", "/app/api/v2/wheels"))
				.await
				.unwrap_err();
			assert_eq!(error_message(&response), MISSING_AUTH_HEADER);
			assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
		}

		#[tokio::test]
		async fn expired_token_is_generic_failure() {
			let response = middleware()
				.authenticate(request("/app/api/v2/wheels", &expired_claims("u1", "a@x.com")))
				.await
				.unwrap_err();
			assert_eq!(response.status_code, 401);
			assert_eq!(error_message(&response), AUTHENTICATION_FAILED);
		}

		#[tokio::test]
		async fn expired_deployment_admin_is_rejected() {
			let claims = Claims {
				exp: Some(chrono::Utc::now().timestamp() - 3600),
				..deployment_admin_claims("u1", "a@x.com")
			};
			let response = middleware()
				.authenticate(request("/app/api/v2/wheels", &claims))
				.await
				.unwrap_err();
			assert_eq!(error_message(&response), AUTHENTICATION_FAILED);
		}

		#[tokio::test]
		async fn malformed_token() {
			let request = ApiRequest::new("GET", "/x").with_header("Authorization", "Bearer nope");
			let response = middleware().authenticate(request).await.unwrap_err();
			assert_eq!(error_message(&response), AUTHENTICATION_FAILED);
		}

		#[tokio::test]
		async fn missing_email_claim() {
			let claims = Claims {
				email: None,
				..valid_claims("u1", "a@x.com")
			};
			let response = middleware()
				.authenticate(request("/app/api/v2/wheels", &claims))
				.await
				.unwrap_err();
			assert_eq!(error_message(&response), MISSING_CLAIMS);
		}

		#[tokio::test]
		async fn missing_subject_is_generic_failure() {
			let claims = Claims {
				sub: None,
				..valid_claims("u1", "a@x.com")
			};
			let response = middleware()
				.authenticate(request("/app/api/v2/wheels", &claims))
				.await
				.unwrap_err();
			assert_eq!(error_message(&response), AUTHENTICATION_FAILED);
		}

		#[tokio::test]
		async fn directory_failure() {
			let middleware = AuthMiddleware::new(Some(test_provider()), Arc::new(FailingDirectory));
			let response = middleware
				.authenticate(request(DEFAULT_SELF_IDENTITY_PATH, &valid_claims("u1", "a@x.com")))
				.await
				.unwrap_err();
			assert_eq!(error_message(&response), AUTHENTICATION_FAILED);
		}

		#[tokio::test]
		async fn unconfigured_provider() {
			let middleware = AuthMiddleware::new(None, directory());
			let response = middleware
				.authenticate(request("/app/api/v2/wheels", &valid_claims("s1", "a@x.com")))
				.await
				.unwrap_err();
			assert_eq!(error_message(&response), AUTHENTICATION_FAILED);
		}
	}
}
