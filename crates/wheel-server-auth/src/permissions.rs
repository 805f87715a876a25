// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role → permission resolution.
//!
//! The capability table lives in [`Permission::minimum_role`]: a role holds a
//! permission iff it is at least as privileged as the permission's minimum
//! role. Both output shapes below (the full boolean map and the list of
//! granted names) are computed from that one function, so they cannot
//! disagree, and the sets are ordered by role privilege by construction.
//!
//! ```text
//! permission             USER  WHEEL_ADMIN  ADMIN  DEPLOYMENT_ADMIN
//! view_wheels             ✓        ✓          ✓          ✓
//! spin_wheel              ✓        ✓          ✓          ✓
//! create_wheel                     ✓          ✓          ✓
//! delete_wheel                     ✓          ✓          ✓
//! manage_participants              ✓          ✓          ✓
//! rig_wheel                        ✓          ✓          ✓
//! manage_users                                ✓          ✓
//! manage_wheel_group                          ✓          ✓
//! view_all_wheel_groups                                  ✓
//! delete_wheel_group                                     ✓
//! manage_deployment                                      ✓
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{Permission, Role};

/// Returns true if `role` holds `permission`.
pub fn role_has_permission(role: Role, permission: Permission) -> bool {
	role.has_permission_of(&permission.minimum_role())
}

/// The complete boolean capability map for one role.
///
/// Serializes as `{"view_wheels": true, "create_wheel": false, ...}` with every
/// permission in the vocabulary present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeMap<Permission, bool>);

impl PermissionSet {
	pub fn for_role(role: Role) -> Self {
		Self(
			Permission::all()
				.iter()
				.map(|permission| (*permission, role_has_permission(role, *permission)))
				.collect(),
		)
	}

	/// Look up a permission by wire name. Unknown names are not granted.
	pub fn get(&self, name: &str) -> bool {
		Permission::from_name(name)
			.map(|permission| self.allows(permission))
			.unwrap_or(false)
	}

	pub fn allows(&self, permission: Permission) -> bool {
		self.0.get(&permission).copied().unwrap_or(false)
	}

	/// Granted permissions, in vocabulary order.
	pub fn granted(&self) -> Vec<Permission> {
		self
			.0
			.iter()
			.filter(|(_, granted)| **granted)
			.map(|(permission, _)| *permission)
			.collect()
	}

	pub fn granted_names(&self) -> Vec<&'static str> {
		self.granted().iter().map(Permission::as_str).collect()
	}

	pub fn iter(&self) -> impl Iterator<Item = (Permission, bool)> + '_ {
		self.0.iter().map(|(permission, granted)| (*permission, *granted))
	}

	/// The map keyed by wire name, as sent to clients.
	pub fn to_name_map(&self) -> BTreeMap<&'static str, bool> {
		self
			.iter()
			.map(|(permission, granted)| (permission.as_str(), granted))
			.collect()
	}
}

/// Resolve a role name to its boolean capability map.
///
/// Total over all strings: unknown role names resolve exactly like `USER`.
pub fn resolve(role: &str) -> PermissionSet {
	PermissionSet::for_role(Role::from_name_or_user(role))
}

/// Resolve a role name to the list of granted permission names.
pub fn resolve_names(role: &str) -> Vec<&'static str> {
	resolve(role).granted_names()
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use std::collections::BTreeSet;

	fn granted_set(role: Role) -> BTreeSet<Permission> {
		PermissionSet::for_role(role).granted().into_iter().collect()
	}

	mod table {
		use super::*;

		#[test]
		fn user_can_view_and_spin_only() {
			assert_eq!(
				resolve_names("USER"),
				vec!["view_wheels", "spin_wheel"]
			);
		}

		#[test]
		fn wheel_admin_manages_wheels() {
			let set = resolve("WHEEL_ADMIN");
			assert!(set.get("create_wheel"));
			assert!(set.get("delete_wheel"));
			assert!(set.get("manage_participants"));
			assert!(set.get("rig_wheel"));
			assert!(!set.get("manage_users"));
			assert!(!set.get("manage_wheel_group"));
		}

		#[test]
		fn admin_manages_wheel_group() {
			let set = resolve("ADMIN");
			assert!(set.get("manage_users"));
			assert!(set.get("manage_wheel_group"));
			assert!(!set.get("view_all_wheel_groups"));
			assert!(!set.get("delete_wheel_group"));
			assert!(!set.get("manage_deployment"));
		}

		#[test]
		fn deployment_admin_holds_every_permission() {
			let set = resolve("DEPLOYMENT_ADMIN");
			for permission in Permission::all() {
				assert!(set.allows(*permission), "{permission}");
			}
			assert_eq!(set.granted().len(), Permission::all().len());
		}

		#[test]
		fn map_lists_every_permission() {
			for role in Role::all() {
				let set = PermissionSet::for_role(*role);
				assert_eq!(set.iter().count(), Permission::all().len());
			}
		}

		#[test]
		fn unknown_permission_name_is_denied() {
			assert!(!resolve("DEPLOYMENT_ADMIN").get("launch_rockets"));
			assert!(!resolve("ADMIN").get(""));
		}

		#[test]
		fn serializes_as_name_to_bool_map() {
			let json = serde_json::to_value(resolve("USER")).unwrap();
			let object = json.as_object().unwrap();
			assert_eq!(object.len(), 11);
			assert_eq!(object["spin_wheel"], true);
			assert_eq!(object["create_wheel"], false);
		}
	}

	mod shapes {
		use super::*;

		#[test]
		fn list_shape_matches_map_shape() {
			for role in Role::all() {
				let map = resolve(role.as_str());
				let names = resolve_names(role.as_str());
				for (permission, granted) in map.iter() {
					assert_eq!(names.contains(&permission.as_str()), granted);
				}
			}
		}

		#[test]
		fn name_map_matches_enum_map() {
			let set = resolve("ADMIN");
			for (name, granted) in set.to_name_map() {
				assert_eq!(set.get(name), granted);
			}
		}
	}

	mod ordering {
		use super::*;

		#[test]
		fn permission_sets_grow_with_privilege() {
			let user = granted_set(Role::User);
			let wheel_admin = granted_set(Role::WheelAdmin);
			let admin = granted_set(Role::Admin);
			let deployment_admin = granted_set(Role::DeploymentAdmin);

			assert!(user.is_subset(&wheel_admin));
			assert!(wheel_admin.is_subset(&admin));
			assert!(admin.is_subset(&deployment_admin));
		}
	}

	fn arb_role() -> impl Strategy<Value = Role> {
		prop::sample::select(Role::all().to_vec())
	}

	proptest! {
		#[test]
		fn resolution_is_deterministic(role in arb_role()) {
			let first = resolve(role.as_str());
			for _ in 0..3 {
				prop_assert_eq!(&resolve(role.as_str()), &first);
			}
		}

		#[test]
		fn higher_roles_never_lose_permissions(a in arb_role(), b in arb_role()) {
			let (low, high) = if a <= b { (a, b) } else { (b, a) };
			prop_assert!(granted_set(low).is_subset(&granted_set(high)));
		}

		#[test]
		fn unknown_roles_resolve_like_user(name in "[A-Za-z_ ]{0,24}") {
			prop_assume!(Role::parse(&name).is_none());
			prop_assert_eq!(resolve(&name), resolve("USER"));
		}
	}
}
