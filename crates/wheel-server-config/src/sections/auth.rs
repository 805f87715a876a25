// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request authentication settings.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SELF_IDENTITY_PATH: &str = "/app/api/v2/auth/me";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
	/// The one path that admits authenticated callers with no wheel group.
	pub self_identity_path: String,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			self_identity_path: DEFAULT_SELF_IDENTITY_PATH.to_string(),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub self_identity_path: Option<String>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.self_identity_path.is_some() {
			self.self_identity_path = other.self_identity_path;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		AuthConfig {
			self_identity_path: self
				.self_identity_path
				.unwrap_or_else(|| DEFAULT_SELF_IDENTITY_PATH.to_string()),
		}
	}
}
