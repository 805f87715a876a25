// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for wheel authorization.
//!
//! This module defines the foundational types used throughout the auth system:
//!
//! - **ID newtypes**: Type-safe wrappers around the string identifiers issued by
//!   the identity provider and the directory ([`UserId`], [`WheelGroupId`])
//! - **Roles**: The closed, privilege-ordered [`Role`] enumeration
//! - **Permissions**: The closed vocabulary of named capabilities ([`Permission`])
//!
//! Role and permission names serialize exactly as they appear on the wire
//! (`WHEEL_ADMIN`, `manage_users`).

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(String);

		impl $name {
			/// Create a new ID from any string-like value.
			pub fn new(id: impl Into<String>) -> Self {
				Self(id.into())
			}

			/// Borrow the raw identifier.
			pub fn as_str(&self) -> &str {
				&self.0
			}

			/// Get the inner string value.
			pub fn into_inner(self) -> String {
				self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl From<String> for $name {
			fn from(id: String) -> Self {
				Self(id)
			}
		}

		impl From<&str> for $name {
			fn from(id: &str) -> Self {
				Self(id.to_string())
			}
		}

		impl From<$name> for String {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(
	UserId,
	"Identifier of a user (the identity provider `sub` for deployment admins)."
);
define_id_type!(WheelGroupId, "Identifier of a wheel group (tenant).");

// =============================================================================
// Roles
// =============================================================================

/// Roles a caller can hold, ordered from least to most privileged.
///
/// `USER`, `WHEEL_ADMIN` and `ADMIN` are tenant roles stored in the user
/// directory. `DEPLOYMENT_ADMIN` is a system-wide role that is only ever
/// granted by the deployment-admin token claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
	/// Can view and spin wheels.
	User,
	/// Manages wheels and participants within a wheel group.
	WheelAdmin,
	/// Manages users and settings of a wheel group.
	Admin,
	/// Operates the deployment across all wheel groups.
	DeploymentAdmin,
}

impl Role {
	/// Returns all roles in privilege order.
	pub fn all() -> &'static [Role] {
		&[
			Role::User,
			Role::WheelAdmin,
			Role::Admin,
			Role::DeploymentAdmin,
		]
	}

	/// The wire name of this role.
	pub fn as_str(&self) -> &'static str {
		match self {
			Role::User => "USER",
			Role::WheelAdmin => "WHEEL_ADMIN",
			Role::Admin => "ADMIN",
			Role::DeploymentAdmin => "DEPLOYMENT_ADMIN",
		}
	}

	/// Parse an exact wire name. Returns `None` for anything else.
	pub fn parse(name: &str) -> Option<Role> {
		Role::all().iter().copied().find(|role| role.as_str() == name)
	}

	/// Parse a role name, falling back to [`Role::User`] for unknown names.
	///
	/// Unrecognized input must never resolve to an elevated role.
	pub fn from_name_or_user(name: &str) -> Role {
		Role::parse(name).unwrap_or(Role::User)
	}

	/// Returns true if this role has at least the privileges of `other`.
	pub fn has_permission_of(&self, other: &Role) -> bool {
		self >= other
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

// =============================================================================
// Permissions
// =============================================================================

/// Named capabilities gating handler operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
	ViewWheels,
	SpinWheel,
	CreateWheel,
	DeleteWheel,
	ManageParticipants,
	RigWheel,
	ManageUsers,
	ManageWheelGroup,
	ViewAllWheelGroups,
	DeleteWheelGroup,
	ManageDeployment,
}

impl Permission {
	/// Returns every permission in the vocabulary.
	pub fn all() -> &'static [Permission] {
		&[
			Permission::ViewWheels,
			Permission::SpinWheel,
			Permission::CreateWheel,
			Permission::DeleteWheel,
			Permission::ManageParticipants,
			Permission::RigWheel,
			Permission::ManageUsers,
			Permission::ManageWheelGroup,
			Permission::ViewAllWheelGroups,
			Permission::DeleteWheelGroup,
			Permission::ManageDeployment,
		]
	}

	/// The wire name of this permission.
	pub fn as_str(&self) -> &'static str {
		match self {
			Permission::ViewWheels => "view_wheels",
			Permission::SpinWheel => "spin_wheel",
			Permission::CreateWheel => "create_wheel",
			Permission::DeleteWheel => "delete_wheel",
			Permission::ManageParticipants => "manage_participants",
			Permission::RigWheel => "rig_wheel",
			Permission::ManageUsers => "manage_users",
			Permission::ManageWheelGroup => "manage_wheel_group",
			Permission::ViewAllWheelGroups => "view_all_wheel_groups",
			Permission::DeleteWheelGroup => "delete_wheel_group",
			Permission::ManageDeployment => "manage_deployment",
		}
	}

	/// Look up a permission by wire name.
	pub fn from_name(name: &str) -> Option<Permission> {
		Permission::all()
			.iter()
			.copied()
			.find(|permission| permission.as_str() == name)
	}

	/// The least privileged role that holds this permission.
	///
	/// Every role at or above the returned role holds the permission.
	pub fn minimum_role(&self) -> Role {
		match self {
			Permission::ViewWheels | Permission::SpinWheel => Role::User,
			Permission::CreateWheel
			| Permission::DeleteWheel
			| Permission::ManageParticipants
			| Permission::RigWheel => Role::WheelAdmin,
			Permission::ManageUsers | Permission::ManageWheelGroup => Role::Admin,
			Permission::ViewAllWheelGroups
			| Permission::DeleteWheelGroup
			| Permission::ManageDeployment => Role::DeploymentAdmin,
		}
	}
}

impl fmt::Display for Permission {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	mod ids {
		use super::*;

		#[test]
		fn user_id_displays_raw_value() {
			let id = UserId::new("u-123");
			assert_eq!(id.to_string(), "u-123");
			assert_eq!(id.as_str(), "u-123");
		}

		#[test]
		fn wheel_group_id_serializes_transparently() {
			let id = WheelGroupId::from("wg-1");
			assert_eq!(serde_json::to_string(&id).unwrap(), "\"wg-1\"");
			let parsed: WheelGroupId = serde_json::from_str("\"wg-1\"").unwrap();
			assert_eq!(parsed, id);
		}
	}

	mod role {
		use super::*;

		#[test]
		fn parse_accepts_exact_wire_names() {
			assert_eq!(Role::parse("USER"), Some(Role::User));
			assert_eq!(Role::parse("WHEEL_ADMIN"), Some(Role::WheelAdmin));
			assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
			assert_eq!(Role::parse("DEPLOYMENT_ADMIN"), Some(Role::DeploymentAdmin));
		}

		#[test]
		fn parse_rejects_other_spellings() {
			assert_eq!(Role::parse("admin"), None);
			assert_eq!(Role::parse(" ADMIN"), None);
			assert_eq!(Role::parse(""), None);
		}

		#[test]
		fn unknown_role_falls_back_to_user() {
			assert_eq!(Role::from_name_or_user("BOGUS"), Role::User);
			assert_eq!(Role::from_name_or_user("SUPERUSER"), Role::User);
			assert_eq!(Role::from_name_or_user(""), Role::User);
		}

		#[test]
		fn privilege_ordering() {
			assert!(Role::DeploymentAdmin.has_permission_of(&Role::Admin));
			assert!(Role::Admin.has_permission_of(&Role::WheelAdmin));
			assert!(Role::WheelAdmin.has_permission_of(&Role::User));
			assert!(Role::User.has_permission_of(&Role::User));
			assert!(!Role::User.has_permission_of(&Role::WheelAdmin));
			assert!(!Role::Admin.has_permission_of(&Role::DeploymentAdmin));
		}

		#[test]
		fn serde_uses_wire_names() {
			assert_eq!(
				serde_json::to_string(&Role::WheelAdmin).unwrap(),
				"\"WHEEL_ADMIN\""
			);
			for role in Role::all() {
				let json = serde_json::to_string(role).unwrap();
				assert_eq!(json, format!("\"{}\"", role.as_str()));
			}
		}
	}

	mod permission {
		use super::*;

		#[test]
		fn vocabulary_has_eleven_permissions() {
			assert_eq!(Permission::all().len(), 11);
		}

		#[test]
		fn names_round_trip_through_from_name() {
			for permission in Permission::all() {
				assert_eq!(Permission::from_name(permission.as_str()), Some(*permission));
			}
			assert_eq!(Permission::from_name("launch_rockets"), None);
		}

		#[test]
		fn serde_names_match_as_str() {
			for permission in Permission::all() {
				let json = serde_json::to_string(permission).unwrap();
				assert_eq!(json, format!("\"{}\"", permission.as_str()));
			}
		}

		#[test]
		fn minimum_roles_match_capability_table() {
			assert_eq!(Permission::SpinWheel.minimum_role(), Role::User);
			assert_eq!(Permission::RigWheel.minimum_role(), Role::WheelAdmin);
			assert_eq!(Permission::ManageUsers.minimum_role(), Role::Admin);
			assert_eq!(
				Permission::ManageDeployment.minimum_role(),
				Role::DeploymentAdmin
			);
		}
	}
}
