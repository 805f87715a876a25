// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User directory collaborator.
//!
//! The directory resolves an authenticated email to its wheel group
//! membership. Storage is abstracted behind [`UserDirectory`]; the process
//! entry point constructs one implementation and shares it for the process
//! lifetime. [`MemoryDirectory`] is the in-process implementation used by the
//! server binary and tests.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AuthError, DirectoryError, Result};

/// A user row as stored in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
	pub user_id: String,
	pub email: String,
	#[serde(default)]
	pub name: String,
	pub wheel_group_id: String,
	/// Raw role name. Resolved leniently; unknown names act as `USER`.
	pub role: String,
}

/// A user's wheel group membership with the wheel group's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantMembership {
	pub user_id: String,
	pub wheel_group_id: String,
	pub wheel_group_name: String,
	pub role: String,
	pub email: String,
	pub name: String,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
	/// Find the user with this email. Email is not the primary key; an
	/// implementation may scan or use a secondary index.
	async fn find_by_email(&self, email: &str) -> std::result::Result<Option<UserRecord>, DirectoryError>;

	async fn find_wheel_group_name(
		&self,
		wheel_group_id: &str,
	) -> std::result::Result<Option<String>, DirectoryError>;
}

/// Resolve an email to its wheel group membership.
///
/// A missing wheel group name is not an error: the raw wheel group id is used
/// as the display name.
///
/// # Errors
///
/// - [`AuthError::UserNotFound`] if no user has this email
/// - [`AuthError::Lookup`] if the directory itself fails
#[instrument(skip_all, fields(email = %email))]
pub async fn lookup_membership(directory: &dyn UserDirectory, email: &str) -> Result<TenantMembership> {
	let record = directory
		.find_by_email(email)
		.await
		.map_err(lookup_failed)?
		.ok_or_else(|| AuthError::UserNotFound(email.to_string()))?;

	let wheel_group_name = match directory
		.find_wheel_group_name(&record.wheel_group_id)
		.await
		.map_err(lookup_failed)?
	{
		Some(name) => name,
		None => {
			tracing::debug!(
				wheel_group_id = %record.wheel_group_id,
				"wheel group name not found, using id"
			);
			record.wheel_group_id.clone()
		}
	};

	Ok(TenantMembership {
		user_id: record.user_id,
		wheel_group_id: record.wheel_group_id,
		wheel_group_name,
		role: record.role,
		email: record.email,
		name: record.name,
	})
}

fn lookup_failed(error: DirectoryError) -> AuthError {
	tracing::warn!(error = %error, "user directory lookup failed");
	AuthError::Lookup(error.to_string())
}

// =============================================================================
// In-memory directory
// =============================================================================

/// A wheel group row as stored in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelGroupRecord {
	pub wheel_group_id: String,
	pub wheel_group_name: String,
}

/// Seed file layout for [`MemoryDirectory::from_seed_file`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectorySeed {
	#[serde(default)]
	pub users: Vec<UserRecord>,
	#[serde(default)]
	pub wheel_groups: Vec<WheelGroupRecord>,
}

/// Immutable in-memory directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
	users: Vec<UserRecord>,
	wheel_groups: HashMap<String, String>,
}

impl MemoryDirectory {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_user(mut self, user: UserRecord) -> Self {
		self.users.push(user);
		self
	}

	pub fn with_wheel_group(
		mut self,
		wheel_group_id: impl Into<String>,
		wheel_group_name: impl Into<String>,
	) -> Self {
		self
			.wheel_groups
			.insert(wheel_group_id.into(), wheel_group_name.into());
		self
	}

	pub fn from_seed(seed: DirectorySeed) -> Self {
		let wheel_groups = seed
			.wheel_groups
			.into_iter()
			.map(|group| (group.wheel_group_id, group.wheel_group_name))
			.collect();
		Self {
			users: seed.users,
			wheel_groups,
		}
	}

	/// Load a JSON seed file of the form `{"users": [...], "wheel_groups": [...]}`.
	pub fn from_seed_file(path: impl AsRef<Path>) -> std::result::Result<Self, DirectoryError> {
		let content = std::fs::read_to_string(path.as_ref())?;
		let seed: DirectorySeed = serde_json::from_str(&content)?;
		tracing::debug!(
			path = %path.as_ref().display(),
			users = seed.users.len(),
			wheel_groups = seed.wheel_groups.len(),
			"loaded directory seed"
		);
		Ok(Self::from_seed(seed))
	}

	pub fn user_count(&self) -> usize {
		self.users.len()
	}
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
	async fn find_by_email(&self, email: &str) -> std::result::Result<Option<UserRecord>, DirectoryError> {
		Ok(self.users.iter().find(|user| user.email == email).cloned())
	}

	async fn find_wheel_group_name(
		&self,
		wheel_group_id: &str,
	) -> std::result::Result<Option<String>, DirectoryError> {
		Ok(self.wheel_groups.get(wheel_group_id).cloned())
	}
}
