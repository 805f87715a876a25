// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity provider (Cognito user pool) settings.
//!
//! Absent settings are not an error. The server starts and every
//! authorization request fails closed until they are supplied.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CognitoConfig {
	pub user_pool_id: String,
	pub client_id: String,
	/// Overrides the region taken from the pool id prefix.
	pub region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CognitoConfigLayer {
	#[serde(default)]
	pub user_pool_id: Option<String>,
	#[serde(default)]
	pub client_id: Option<String>,
	#[serde(default)]
	pub region: Option<String>,
}

impl CognitoConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.user_pool_id.is_some() {
			self.user_pool_id = other.user_pool_id;
		}
		if other.client_id.is_some() {
			self.client_id = other.client_id;
		}
		if other.region.is_some() {
			self.region = other.region;
		}
	}

	/// Returns `None` unless both the pool id and client id are non-blank.
	pub fn finalize(self) -> Option<CognitoConfig> {
		let user_pool_id = non_blank(self.user_pool_id)?;
		let client_id = non_blank(self.client_id)?;
		Some(CognitoConfig {
			user_pool_id,
			client_id,
			region: non_blank(self.region),
		})
	}

	/// True when exactly one of pool id and client id is set.
	pub fn is_partial(&self) -> bool {
		let pool = self.user_pool_id.as_deref().is_some_and(|s| !s.trim().is_empty());
		let client = self.client_id.as_deref().is_some_and(|s| !s.trim().is_empty());
		pool != client
	}
}

fn non_blank(value: Option<String>) -> Option<String> {
	value
		.map(|s| s.trim().to_string())
		.filter(|s| !s.is_empty())
}
