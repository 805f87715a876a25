// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Gateway-proxy request and response shapes.
//!
//! Handlers, the middleware and the permission gates all speak these types.
//! Headers are a plain string map: lookups are exact, which the middleware
//! relies on for its header-casing rules.

use std::collections::{BTreeMap, HashMap};

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::context::AuthorizationContext;
use crate::types::UserId;

/// Authorizer values the gateway attached to a proxied request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub authorizer: Option<HashMap<String, Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
	#[serde(default)]
	pub path: String,
	#[serde(default)]
	pub http_method: String,
	#[serde(default)]
	pub headers: HashMap<String, String>,
	#[serde(default)]
	pub path_parameters: HashMap<String, String>,
	#[serde(default)]
	pub query_string_parameters: HashMap<String, String>,
	#[serde(default)]
	pub body: Option<String>,
	#[serde(default)]
	pub request_context: RequestContext,

	/// Set by the middleware on success. Never read from the wire.
	#[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
	pub wheel_group_context: Option<AuthorizationContext>,

	/// Set by the middleware on success. Never read from the wire.
	#[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
	pub user_info: Option<UserInfo>,
}

impl ApiRequest {
	pub fn new(http_method: impl Into<String>, path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			http_method: http_method.into(),
			..Self::default()
		}
	}

	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());
		self
	}

	pub fn with_body(mut self, body: impl Into<String>) -> Self {
		self.body = Some(body.into());
		self
	}

	/// The context attached by the middleware, if it ran.
	pub fn context(&self) -> Option<&AuthorizationContext> {
		self.wheel_group_context.as_ref()
	}

	/// Rebuild the caller's context from values a gateway authorizer attached.
	pub fn gateway_context(&self) -> Option<AuthorizationContext> {
		self
			.request_context
			.authorizer
			.as_ref()
			.and_then(AuthorizationContext::from_gateway_context)
	}
}

/// The caller summary attached next to the authorization context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
	pub user_id: UserId,
	pub email: String,
	pub name: String,
	pub deployment_admin: bool,
}

impl From<&AuthorizationContext> for UserInfo {
	fn from(context: &AuthorizationContext) -> Self {
		Self {
			user_id: context.user_id().clone(),
			email: context.email().to_string(),
			name: context.name().to_string(),
			deployment_admin: context.is_deployment_admin(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
	pub status_code: u16,
	pub headers: BTreeMap<String, String>,
	pub body: String,
}

impl ApiResponse {
	/// A JSON response with the standard content-type and cross-origin headers.
	pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
		let body = match serde_json::to_string(value) {
			Ok(body) => body,
			Err(e) => {
				tracing::warn!(error = %e, "failed to serialize response body");
				return Self::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
			}
		};

		Self {
			status_code: status.as_u16(),
			headers: standard_headers(),
			body,
		}
	}

	pub fn error(status: StatusCode, message: &str) -> Self {
		Self {
			status_code: status.as_u16(),
			headers: standard_headers(),
			body: json!({ "error": message }).to_string(),
		}
	}

	pub fn unauthorized(message: &str) -> Self {
		Self::error(StatusCode::UNAUTHORIZED, message)
	}

	pub fn status(&self) -> StatusCode {
		StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// Parse the body as JSON. Returns `Value::Null` for a non-JSON body.
	pub fn body_json(&self) -> Value {
		serde_json::from_str(&self.body).unwrap_or(Value::Null)
	}
}

fn standard_headers() -> BTreeMap<String, String> {
	BTreeMap::from([
		("Content-Type".to_string(), "application/json".to_string()),
		("Access-Control-Allow-Origin".to_string(), "*".to_string()),
	])
}
