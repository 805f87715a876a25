// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The verified caller identity derived from validated claims.

use serde::Serialize;

use crate::claims::{decode_token, Claims};
use crate::error::{AuthError, Result};
use crate::types::UserId;
use crate::validation::{validate_claims, IdentityProvider};

/// Who the token says the caller is.
///
/// `is_deployment_admin` is computed here, once, from the deployment-admin
/// claim. Nothing downstream reads the raw claim again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
	pub subject_id: UserId,
	pub email: String,
	pub name: String,
	pub is_deployment_admin: bool,
}

impl Identity {
	/// Build an identity from validated claims.
	///
	/// The display name falls back from `name` to `cognito:username` to the
	/// email address.
	///
	/// # Errors
	///
	/// Returns [`AuthError::MissingIdentityClaims`] if `sub` or `email` is
	/// absent or empty.
	pub fn from_claims(claims: &Claims) -> Result<Self> {
		let subject_id = non_empty(claims.sub.as_deref()).ok_or(AuthError::MissingIdentityClaims)?;
		let email = non_empty(claims.email.as_deref()).ok_or(AuthError::MissingIdentityClaims)?;
		let name = non_empty(claims.name.as_deref())
			.or_else(|| non_empty(claims.username.as_deref()))
			.unwrap_or(email);

		Ok(Self {
			subject_id: UserId::new(subject_id),
			email: email.to_string(),
			name: name.to_string(),
			is_deployment_admin: claims.is_deployment_admin(),
		})
	}

	/// Decode, validate and convert a raw bearer token.
	///
	/// # Errors
	///
	/// - [`AuthError::NotConfigured`] if no provider is configured
	/// - [`AuthError::TokenFormat`] / [`AuthError::TokenValidation`] from decoding and validation
	/// - [`AuthError::MissingIdentityClaims`] if `sub` or `email` is unusable
	pub fn from_token(token: &str, provider: Option<&IdentityProvider>) -> Result<Self> {
		let provider = provider.ok_or(AuthError::NotConfigured("user pool and client id"))?;
		let claims = validate_claims(decode_token(token)?, provider)?;
		Self::from_claims(&claims)
	}
}

fn non_empty(value: Option<&str>) -> Option<&str> {
	value.filter(|v| !v.trim().is_empty())
}
