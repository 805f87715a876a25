// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The per-request authorization context.
//!
//! An [`AuthorizationContext`] bundles who the caller is, which wheel group
//! they belong to, their role and the permissions that role grants. It is
//! built fresh for every request and never cached.
//!
//! # Invariants
//!
//! - A deployment-admin context has no wheel group, role `DEPLOYMENT_ADMIN`
//!   and the full permission set.
//! - A non-deployment-admin context never holds `DEPLOYMENT_ADMIN`, whatever
//!   the directory says.
//! - `permissions` is always the resolver output for `role`.
//!
//! Fields are private so these hold for every value of the type.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::directory::{lookup_membership, TenantMembership, UserDirectory};
use crate::error::Result;
use crate::identity::Identity;
use crate::permissions::PermissionSet;
use crate::types::{Permission, Role, UserId, WheelGroupId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationContext {
	user_id: UserId,
	email: String,
	name: String,
	role: Role,
	wheel_group_id: Option<WheelGroupId>,
	wheel_group_name: Option<String>,
	deployment_admin: bool,
	permissions: PermissionSet,
}

impl AuthorizationContext {
	/// System-level context for a deployment admin. No wheel group.
	pub fn deployment_admin(identity: &Identity) -> Self {
		Self::system(
			identity.subject_id.clone(),
			identity.email.clone(),
			identity.name.clone(),
		)
	}

	/// Context for a provisioned wheel group member.
	pub fn for_member(identity: &Identity, membership: TenantMembership) -> Self {
		let role = tenant_role(&membership.role, &membership.user_id);
		let name = if membership.name.trim().is_empty() {
			identity.name.clone()
		} else {
			membership.name
		};
		let email = if membership.email.is_empty() {
			identity.email.clone()
		} else {
			membership.email
		};

		Self::member(
			UserId::new(membership.user_id),
			email,
			name,
			role,
			Some(WheelGroupId::new(membership.wheel_group_id)),
			Some(membership.wheel_group_name),
		)
	}

	/// Context for an authenticated caller with no wheel group membership yet.
	///
	/// Only the self-identity endpoint accepts this context.
	pub fn unprovisioned(identity: &Identity) -> Self {
		Self::member(
			identity.subject_id.clone(),
			identity.email.clone(),
			identity.name.clone(),
			Role::User,
			None,
			None,
		)
	}

	fn system(user_id: UserId, email: String, name: String) -> Self {
		Self {
			user_id,
			email,
			name,
			role: Role::DeploymentAdmin,
			wheel_group_id: None,
			wheel_group_name: None,
			deployment_admin: true,
			permissions: PermissionSet::for_role(Role::DeploymentAdmin),
		}
	}

	fn member(
		user_id: UserId,
		email: String,
		name: String,
		role: Role,
		wheel_group_id: Option<WheelGroupId>,
		wheel_group_name: Option<String>,
	) -> Self {
		Self {
			user_id,
			email,
			name,
			role,
			wheel_group_id,
			wheel_group_name,
			deployment_admin: false,
			permissions: PermissionSet::for_role(role),
		}
	}

	pub fn user_id(&self) -> &UserId {
		&self.user_id
	}

	pub fn email(&self) -> &str {
		&self.email
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn role(&self) -> Role {
		self.role
	}

	pub fn wheel_group_id(&self) -> Option<&WheelGroupId> {
		self.wheel_group_id.as_ref()
	}

	pub fn wheel_group_name(&self) -> Option<&str> {
		self.wheel_group_name.as_deref()
	}

	pub fn is_deployment_admin(&self) -> bool {
		self.deployment_admin
	}

	pub fn permissions(&self) -> &PermissionSet {
		&self.permissions
	}

	/// Check a permission by wire name. Unknown names are not granted.
	pub fn has_permission(&self, name: &str) -> bool {
		self.permissions.get(name)
	}

	pub fn allows(&self, permission: Permission) -> bool {
		self.permissions.allows(permission)
	}

	/// Render this context as the string-only map carried by a gateway policy.
	///
	/// `null` renders as an empty string, booleans as `"true"`/`"false"`, and the
	/// permission map as compact JSON under `permissions`.
	pub fn to_gateway_context(&self) -> BTreeMap<String, String> {
		let permissions: Map<String, Value> = self
			.permissions
			.iter()
			.map(|(permission, granted)| (permission.as_str().to_string(), Value::Bool(granted)))
			.collect();

		let mut values = Map::new();
		values.insert("user_id".into(), Value::String(self.user_id.to_string()));
		values.insert("email".into(), Value::String(self.email.clone()));
		values.insert("name".into(), Value::String(self.name.clone()));
		values.insert("role".into(), Value::String(self.role.to_string()));
		values.insert(
			"wheel_group_id".into(),
			self
				.wheel_group_id
				.as_ref()
				.map_or(Value::Null, |id| Value::String(id.to_string())),
		);
		values.insert(
			"wheel_group_name".into(),
			self
				.wheel_group_name
				.clone()
				.map_or(Value::Null, Value::String),
		);
		values.insert("deployment_admin".into(), Value::Bool(self.deployment_admin));
		values.insert("permissions".into(), Value::Object(permissions));

		stringify_context(values)
	}

	/// Rebuild a context from a gateway authorizer context map.
	///
	/// Permissions are re-derived from the role; any `permissions` entry in the
	/// map is ignored. Returns `None` if `user_id` is missing.
	pub fn from_gateway_context(context: &HashMap<String, Value>) -> Option<Self> {
		let text = |key: &str| context.get(key).map(render_value).unwrap_or_default();

		let user_id = text("user_id");
		if user_id.is_empty() {
			return None;
		}

		if text("deployment_admin") == "true" {
			return Some(Self::system(
				UserId::new(user_id),
				text("email"),
				text("name"),
			));
		}

		let role = tenant_role(&text("role"), &user_id);
		let wheel_group_id = Some(text("wheel_group_id")).filter(|id| !id.is_empty());
		let wheel_group_name = Some(text("wheel_group_name")).filter(|name| !name.is_empty());

		Some(Self::member(
			UserId::new(user_id),
			text("email"),
			text("name"),
			role,
			wheel_group_id.map(WheelGroupId::new),
			wheel_group_name,
		))
	}
}

/// Build the authorization context for a validated identity.
///
/// Deployment admins never touch the directory.
///
/// # Errors
///
/// Propagates [`crate::AuthError::UserNotFound`] and [`crate::AuthError::Lookup`]
/// from the directory; the caller decides the policy for each.
#[instrument(skip_all, fields(user_id = %identity.subject_id, deployment_admin = identity.is_deployment_admin))]
pub async fn build_context(
	identity: &Identity,
	directory: &dyn UserDirectory,
) -> Result<AuthorizationContext> {
	if identity.is_deployment_admin {
		tracing::debug!("deployment admin, skipping directory lookup");
		return Ok(AuthorizationContext::deployment_admin(identity));
	}

	let membership = lookup_membership(directory, &identity.email).await?;
	Ok(AuthorizationContext::for_member(identity, membership))
}

/// Coerce JSON values to the strings a gateway context can carry.
pub fn stringify_context(values: Map<String, Value>) -> BTreeMap<String, String> {
	values
		.into_iter()
		.map(|(key, value)| {
			let rendered = render_value(&value);
			(key, rendered)
		})
		.collect()
}

fn render_value(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		Value::Bool(b) => b.to_string(),
		Value::Number(n) => n.to_string(),
		other => other.to_string(),
	}
}

/// Resolve a directory role name for a wheel group member.
///
/// `DEPLOYMENT_ADMIN` is only ever granted by the token claim, so a directory
/// row claiming it is treated as `USER`.
fn tenant_role(name: &str, user_id: &str) -> Role {
	match Role::from_name_or_user(name) {
		Role::DeploymentAdmin => {
			tracing::warn!(
				user_id = %user_id,
				"directory role DEPLOYMENT_ADMIN ignored for wheel group member"
			);
			Role::User
		}
		role => role,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::directory::MemoryDirectory;
	use crate::error::AuthError;
	use crate::testing::{
		deployment_admin_claims, user_record, valid_claims, FailingDirectory, UnreachableDirectory,
	};
	use proptest::prelude::*;
	use serde_json::json;

	fn identity(claims: &crate::claims::Claims) -> Identity {
		Identity::from_claims(claims).unwrap()
	}

	fn member_directory(role: &str) -> MemoryDirectory {
		MemoryDirectory::new()
			.with_user(user_record("u-42", "a@x.com", "wg-1", role))
			.with_wheel_group("wg-1", "Wheel Group One")
	}

	mod deployment_admin {
		use super::*;

		#[tokio::test]
		async fn builds_system_context_without_lookup() {
			let identity = identity(&deployment_admin_claims("u1", "a@x.com"));
			let ctx = build_context(&identity, &UnreachableDirectory).await.unwrap();

			assert_eq!(ctx.role(), Role::DeploymentAdmin);
			assert!(ctx.is_deployment_admin());
			assert!(ctx.wheel_group_id().is_none());
			assert!(ctx.wheel_group_name().is_none());
			assert_eq!(ctx.user_id().as_str(), "u1");
			assert_eq!(ctx.email(), "a@x.com");
			assert_eq!(ctx.permissions(), &PermissionSet::for_role(Role::DeploymentAdmin));
		}

		#[tokio::test]
		async fn ignores_directory_membership() {
			let identity = identity(&deployment_admin_claims("u1", "a@x.com"));
			let ctx = build_context(&identity, &member_directory("USER"))
				.await
				.unwrap();
			assert!(ctx.wheel_group_id().is_none());
			assert_eq!(ctx.role(), Role::DeploymentAdmin);
		}

		#[test]
		fn satisfies_every_permission() {
			let ctx = AuthorizationContext::deployment_admin(&identity(&deployment_admin_claims(
				"u1", "a@x.com",
			)));
			for permission in Permission::all() {
				assert!(ctx.has_permission(permission.as_str()));
			}
		}
	}

	mod member {
		use super::*;

		#[tokio::test]
		async fn populates_context_from_membership() {
			let identity = identity(&valid_claims("sub-1", "a@x.com"));
			let ctx = build_context(&identity, &member_directory("WHEEL_ADMIN"))
				.await
				.unwrap();

			assert_eq!(ctx.role(), Role::WheelAdmin);
			assert_eq!(ctx.user_id().as_str(), "u-42");
			assert_eq!(ctx.wheel_group_id().map(WheelGroupId::as_str), Some("wg-1"));
			assert_eq!(ctx.wheel_group_name(), Some("Wheel Group One"));
			assert!(!ctx.is_deployment_admin());
			assert!(ctx.has_permission("create_wheel"));
			assert!(!ctx.has_permission("manage_users"));
		}

		#[tokio::test]
		async fn unknown_directory_role_acts_as_user() {
			let identity = identity(&valid_claims("sub-1", "a@x.com"));
			let ctx = build_context(&identity, &member_directory("OVERLORD"))
				.await
				.unwrap();
			assert_eq!(ctx.role(), Role::User);
			assert_eq!(ctx.permissions(), &PermissionSet::for_role(Role::User));
		}

		#[tokio::test]
		async fn directory_cannot_grant_deployment_admin() {
			let identity = identity(&valid_claims("sub-1", "a@x.com"));
			let ctx = build_context(&identity, &member_directory("DEPLOYMENT_ADMIN"))
				.await
				.unwrap();
			assert_eq!(ctx.role(), Role::User);
			assert!(!ctx.is_deployment_admin());
			assert!(!ctx.has_permission("manage_deployment"));
		}

		#[tokio::test]
		async fn missing_user_is_reported() {
			let identity = identity(&valid_claims("sub-1", "new@x.com"));
			let err = build_context(&identity, &member_directory("ADMIN"))
				.await
				.unwrap_err();
			assert_eq!(err, AuthError::UserNotFound("new@x.com".to_string()));
		}

		#[tokio::test]
		async fn storage_fault_is_reported() {
			let identity = identity(&valid_claims("sub-1", "a@x.com"));
			let err = build_context(&identity, &FailingDirectory).await.unwrap_err();
			assert!(matches!(err, AuthError::Lookup(_)));
		}

		#[test]
		fn unprovisioned_context_is_plain_user() {
			let ctx = AuthorizationContext::unprovisioned(&identity(&valid_claims("s", "a@x.com")));
			assert_eq!(ctx.role(), Role::User);
			assert!(ctx.wheel_group_id().is_none());
			assert_eq!(ctx.permissions(), &PermissionSet::for_role(Role::User));
		}
	}

	mod gateway_context {
		use super::*;

		fn as_json_map(context: BTreeMap<String, String>) -> HashMap<String, Value> {
			context
				.into_iter()
				.map(|(key, value)| (key, Value::String(value)))
				.collect()
		}

		#[test]
		fn every_value_is_a_string() {
			let ctx = AuthorizationContext::deployment_admin(&identity(&deployment_admin_claims(
				"u1", "a@x.com",
			)));
			let map = ctx.to_gateway_context();
			assert_eq!(map["deployment_admin"], "true");
			assert_eq!(map["role"], "DEPLOYMENT_ADMIN");
			assert_eq!(map["wheel_group_id"], "");
			assert_eq!(map["wheel_group_name"], "");

			let permissions: HashMap<String, bool> = serde_json::from_str(&map["permissions"]).unwrap();
			assert_eq!(permissions.len(), Permission::all().len());
			assert!(permissions.values().all(|granted| *granted));
		}

		#[test]
		fn stringify_renders_scalars() {
			let values = json!({
				"count": 3,
				"ratio": 0.5,
				"enabled": false,
				"missing": null,
				"label": "x",
			});
			let Value::Object(values) = values else {
				unreachable!()
			};
			let map = stringify_context(values);
			assert_eq!(map["count"], "3");
			assert_eq!(map["ratio"], "0.5");
			assert_eq!(map["enabled"], "false");
			assert_eq!(map["missing"], "");
			assert_eq!(map["label"], "x");
		}

		#[test]
		fn member_context_survives_gateway_transport() {
			let membership = TenantMembership {
				user_id: "u-42".into(),
				wheel_group_id: "wg-1".into(),
				wheel_group_name: "One".into(),
				role: "ADMIN".into(),
				email: "a@x.com".into(),
				name: "A".into(),
			};
			let ctx =
				AuthorizationContext::for_member(&identity(&valid_claims("s", "a@x.com")), membership);
			let rebuilt =
				AuthorizationContext::from_gateway_context(&as_json_map(ctx.to_gateway_context()))
					.unwrap();
			assert_eq!(rebuilt, ctx);
		}

		#[test]
		fn carried_permissions_are_not_trusted() {
			let mut map = HashMap::new();
			map.insert("user_id".to_string(), json!("u1"));
			map.insert("role".to_string(), json!("USER"));
			map.insert("wheel_group_id".to_string(), json!("wg-1"));
			map.insert(
				"permissions".to_string(),
				json!(r#"{"manage_users": true}"#),
			);
			let ctx = AuthorizationContext::from_gateway_context(&map).unwrap();
			assert!(!ctx.has_permission("manage_users"));
		}

		#[test]
		fn accepts_native_boolean_flag() {
			let mut map = HashMap::new();
			map.insert("user_id".to_string(), json!("u1"));
			map.insert("deployment_admin".to_string(), json!(true));
			map.insert("wheel_group_id".to_string(), json!("wg-1"));
			let ctx = AuthorizationContext::from_gateway_context(&map).unwrap();
			assert!(ctx.is_deployment_admin());
			assert!(ctx.wheel_group_id().is_none());
		}

		#[test]
		fn requires_user_id() {
			assert!(AuthorizationContext::from_gateway_context(&HashMap::new()).is_none());
		}
	}

	proptest! {
		#[test]
		fn deployment_admin_context_is_isolated(
			sub in "[a-z0-9-]{1,36}",
			email in "[a-z]{1,10}@[a-z]{1,10}\\.org",
			directory_role in "USER|WHEEL_ADMIN|ADMIN|DEPLOYMENT_ADMIN|BOGUS",
		) {
			let identity = identity(&deployment_admin_claims(&sub, &email));
			let directory = MemoryDirectory::new()
				.with_user(user_record("other", &email, "wg-9", &directory_role))
				.with_wheel_group("wg-9", "Nine");

			let ctx = tokio_test::block_on(build_context(&identity, &directory)).unwrap();
			prop_assert!(ctx.wheel_group_id().is_none());
			prop_assert!(ctx.is_deployment_admin());
			prop_assert_eq!(ctx.permissions(), &PermissionSet::for_role(Role::DeploymentAdmin));

			let unreachable = tokio_test::block_on(build_context(&identity, &UnreachableDirectory)).unwrap();
			prop_assert_eq!(unreachable, ctx);
		}
	}
}
