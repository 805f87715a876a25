// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Builders and directory doubles for tests.
//!
//! Tokens produced here carry a fixed, meaningless signature: the decoder never
//! verifies it.

use async_trait::async_trait;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::Utc;

use crate::claims::Claims;
use crate::directory::{UserDirectory, UserRecord};
use crate::error::DirectoryError;
use crate::validation::IdentityProvider;

pub const TEST_POOL_ID: &str = "us-west-2_TestPool1";
pub const TEST_CLIENT_ID: &str = "test-client-id";

const TEST_HEADER: &[u8] = br#"{"alg":"RS256","typ":"JWT"}"#;
const TEST_SIGNATURE: &[u8] = b"sig!";

pub fn test_provider() -> IdentityProvider {
	IdentityProvider::new(TEST_POOL_ID, TEST_CLIENT_ID)
}

/// Claims that pass validation against [`test_provider`] for the next hour.
pub fn valid_claims(sub: &str, email: &str) -> Claims {
	Claims {
		sub: Some(sub.to_string()),
		exp: Some(Utc::now().timestamp() + 3600),
		iss: Some(test_provider().issuer()),
		aud: Some(TEST_CLIENT_ID.to_string()),
		email: Some(email.to_string()),
		name: None,
		username: None,
		deployment_admin: None,
	}
}

pub fn deployment_admin_claims(sub: &str, email: &str) -> Claims {
	Claims {
		deployment_admin: Some("true".to_string()),
		..valid_claims(sub, email)
	}
}

pub fn expired_claims(sub: &str, email: &str) -> Claims {
	Claims {
		exp: Some(Utc::now().timestamp() - 3600),
		..valid_claims(sub, email)
	}
}

/// Encode claims as an unpadded `header.payload.signature` token.
pub fn encode_token(claims: &Claims) -> String {
	let payload = serde_json::to_vec(claims).unwrap();
	format!(
		"{}.{}.{}",
		URL_SAFE_NO_PAD.encode(TEST_HEADER),
		URL_SAFE_NO_PAD.encode(payload),
		URL_SAFE_NO_PAD.encode(TEST_SIGNATURE)
	)
}

/// Encode claims with `=` padding on every segment that needs it.
pub fn encode_token_with_padding(claims: &Claims) -> String {
	let payload = serde_json::to_vec(claims).unwrap();
	format!(
		"{}.{}.{}",
		URL_SAFE.encode(TEST_HEADER),
		URL_SAFE.encode(payload),
		URL_SAFE.encode(TEST_SIGNATURE)
	)
}

pub fn bearer(claims: &Claims) -> String {
	format!("Bearer {}", encode_token(claims))
}

pub fn user_record(user_id: &str, email: &str, wheel_group_id: &str, role: &str) -> UserRecord {
	UserRecord {
		user_id: user_id.to_string(),
		email: email.to_string(),
		name: email.split('@').next().unwrap_or(email).to_string(),
		wheel_group_id: wheel_group_id.to_string(),
		role: role.to_string(),
	}
}

/// A directory whose every call fails with a storage fault.
pub struct FailingDirectory;

#[async_trait]
impl UserDirectory for FailingDirectory {
	async fn find_by_email(&self, _email: &str) -> Result<Option<UserRecord>, DirectoryError> {
		Err(DirectoryError::Storage("connection reset".to_string()))
	}

	async fn find_wheel_group_name(
		&self,
		_wheel_group_id: &str,
	) -> Result<Option<String>, DirectoryError> {
		Err(DirectoryError::Storage("connection reset".to_string()))
	}
}

/// A directory that finds every user but fails the wheel group lookup.
pub struct WheelGroupFaultDirectory(pub UserRecord);

#[async_trait]
impl UserDirectory for WheelGroupFaultDirectory {
	async fn find_by_email(&self, _email: &str) -> Result<Option<UserRecord>, DirectoryError> {
		Ok(Some(self.0.clone()))
	}

	async fn find_wheel_group_name(
		&self,
		_wheel_group_id: &str,
	) -> Result<Option<String>, DirectoryError> {
		Err(DirectoryError::Storage("wheel group table unavailable".to_string()))
	}
}

/// A directory that panics when called. Use it to prove a code path never
/// performs a lookup.
pub struct UnreachableDirectory;

#[async_trait]
impl UserDirectory for UnreachableDirectory {
	async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DirectoryError> {
		panic!("directory lookup attempted for {email}");
	}

	async fn find_wheel_group_name(
		&self,
		wheel_group_id: &str,
	) -> Result<Option<String>, DirectoryError> {
		panic!("wheel group lookup attempted for {wheel_group_id}");
	}
}
