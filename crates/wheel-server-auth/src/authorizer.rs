// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! API gateway custom authorizer.
//!
//! [`GatewayAuthorizer::authorize`] turns a TOKEN authorizer event into an
//! IAM policy. It has two outcomes:
//!
//! - **Allow**: principal is the caller's email, the resource is the method
//!   ARN widened to `<api>/<stage>/*/*`, and the authorization context rides
//!   along as a string-only map.
//! - **Deny**: principal is `"user"` with no context.
//!
//! Every failure is a Deny. Nothing is returned as an error.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::context::{build_context, AuthorizationContext};
use crate::directory::UserDirectory;
use crate::error::Result;
use crate::identity::Identity;
use crate::validation::IdentityProvider;

pub const POLICY_VERSION: &str = "2012-10-17";
pub const INVOKE_ACTION: &str = "execute-api:Invoke";
pub const DENY_PRINCIPAL: &str = "user";

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerEvent {
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub event_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub authorization_token: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub method_arn: Option<String>,
}

impl AuthorizerEvent {
	pub fn token(authorization_token: impl Into<String>, method_arn: impl Into<String>) -> Self {
		Self {
			event_type: Some("TOKEN".to_string()),
			authorization_token: Some(authorization_token.into()),
			method_arn: Some(method_arn.into()),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
	Allow,
	Deny,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
	pub action: String,
	pub effect: Effect,
	pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
	pub version: String,
	pub statement: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
	pub principal_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub policy_document: Option<PolicyDocument>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub context: Option<BTreeMap<String, String>>,
}

impl AuthorizerResponse {
	/// The effect of the first statement, if there is one.
	pub fn effect(&self) -> Option<Effect> {
		self
			.policy_document
			.as_ref()
			.and_then(|document| document.statement.first())
			.map(|statement| statement.effect)
	}

	pub fn is_allowed(&self) -> bool {
		self.effect() == Some(Effect::Allow)
	}
}

/// Assemble an IAM policy response.
///
/// The policy document is only present when both `effect` and `resource` are
/// given; without them the response carries the principal alone.
pub fn build_policy(
	principal_id: impl Into<String>,
	effect: Option<Effect>,
	resource: Option<&str>,
	context: Option<BTreeMap<String, String>>,
) -> AuthorizerResponse {
	let policy_document = match (effect, resource) {
		(Some(effect), Some(resource)) => Some(PolicyDocument {
			version: POLICY_VERSION.to_string(),
			statement: vec![PolicyStatement {
				action: INVOKE_ACTION.to_string(),
				effect,
				resource: resource.to_string(),
			}],
		}),
		_ => None,
	};

	AuthorizerResponse {
		principal_id: principal_id.into(),
		policy_document,
		context,
	}
}

/// Widen a method ARN to every method and path of its stage.
///
/// `arn:aws:execute-api:us-west-2:123:abc/dev/GET/api/v2/wheels` becomes
/// `arn:aws:execute-api:us-west-2:123:abc/dev/*/*`. An ARN without a
/// non-empty stage segment is returned unchanged.
pub fn wildcard_resource(method_arn: &str) -> String {
	let mut parts = method_arn.split('/');
	match (parts.next(), parts.next()) {
		(Some(api), Some(stage)) if !stage.is_empty() => format!("{api}/{stage}/*/*"),
		_ => method_arn.to_string(),
	}
}

/// The gateway authorizer. Cheap to clone; share one per process.
#[derive(Clone)]
pub struct GatewayAuthorizer {
	provider: Option<IdentityProvider>,
	directory: Arc<dyn UserDirectory>,
}

impl GatewayAuthorizer {
	/// `provider` is `None` when the process has no identity-provider
	/// settings; every request is then denied.
	pub fn new(provider: Option<IdentityProvider>, directory: Arc<dyn UserDirectory>) -> Self {
		Self { provider, directory }
	}

	pub fn is_configured(&self) -> bool {
		self.provider.is_some()
	}

	#[instrument(skip_all, fields(method_arn = event.method_arn.as_deref().unwrap_or_default()))]
	pub async fn authorize(&self, event: &AuthorizerEvent) -> AuthorizerResponse {
		let method_arn = event.method_arn.as_deref().unwrap_or_default();

		match self.resolve(event).await {
			Ok(context) => {
				tracing::debug!(
					user_id = %context.user_id(),
					role = %context.role(),
					deployment_admin = context.is_deployment_admin(),
					"gateway authorization allowed"
				);
				build_policy(
					context.email(),
					Some(Effect::Allow),
					Some(&wildcard_resource(method_arn)),
					Some(context.to_gateway_context()),
				)
			}
			Err(e) => {
				tracing::info!(reason = %e, "gateway authorization denied");
				deny(method_arn)
			}
		}
	}

	async fn resolve(&self, event: &AuthorizerEvent) -> Result<AuthorizationContext> {
		let raw = event.authorization_token.as_deref().unwrap_or_default();
		let token = raw.strip_prefix(BEARER_PREFIX).unwrap_or(raw);
		let identity = Identity::from_token(token, self.provider.as_ref())?;
		build_context(&identity, self.directory.as_ref()).await
	}
}

/// Deny policy for `method_arn`. The resource is the requested ARN as given.
pub fn deny(method_arn: &str) -> AuthorizerResponse {
	build_policy(DENY_PRINCIPAL, Some(Effect::Deny), Some(method_arn), None)
}
