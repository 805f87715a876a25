// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Semantic validation of decoded claims against the configured identity provider.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. `sub`, `exp`, `iss`, `aud` are present
//! 2. `exp` is in the future
//! 3. `iss` is the user pool's issuer URL
//! 4. `aud` is the configured client id
//!
//! Some provider environments render the issuer host as `cognitm-idp` instead
//! of `cognito-idp`. Both spellings validate against the same pool.

use std::borrow::Cow;

use chrono::Utc;

use crate::claims::Claims;
use crate::error::{AuthError, Result};

const ISSUER_HOST: &str = "://cognito-idp.";
const ISSUER_HOST_MISRENDERED: &str = "://cognitm-idp.";

const REQUIRED_CLAIMS: [&str; 4] = ["sub", "exp", "iss", "aud"];

/// User pool parameters a token must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProvider {
	pub user_pool_id: String,
	pub client_id: String,
	pub region: String,
}

impl IdentityProvider {
	/// Build provider settings, taking the region from the pool id prefix
	/// (`us-west-2_AbC` → `us-west-2`).
	pub fn new(user_pool_id: impl Into<String>, client_id: impl Into<String>) -> Self {
		let user_pool_id = user_pool_id.into();
		let region = user_pool_id
			.split_once('_')
			.map(|(region, _)| region.to_string())
			.unwrap_or_default();
		Self {
			user_pool_id,
			client_id: client_id.into(),
			region,
		}
	}

	/// Override the region derived from the pool id.
	pub fn with_region(mut self, region: impl Into<String>) -> Self {
		self.region = region.into();
		self
	}

	/// Build settings from optional configuration values.
	///
	/// Returns `None` if either value is missing or blank; callers must then
	/// deny every request.
	pub fn from_optional(
		user_pool_id: Option<&str>,
		client_id: Option<&str>,
		region: Option<&str>,
	) -> Option<Self> {
		let user_pool_id = user_pool_id.map(str::trim).filter(|s| !s.is_empty())?;
		let client_id = client_id.map(str::trim).filter(|s| !s.is_empty())?;
		let provider = Self::new(user_pool_id, client_id);
		Some(match region.map(str::trim).filter(|s| !s.is_empty()) {
			Some(region) => provider.with_region(region),
			None => provider,
		})
	}

	/// The issuer URL tokens from this pool carry.
	pub fn issuer(&self) -> String {
		format!(
			"https://cognito-idp.{}.amazonaws.com/{}",
			self.region, self.user_pool_id
		)
	}
}

/// Rewrite the misrendered `cognitm-idp` issuer host to `cognito-idp`.
pub fn normalize_issuer(issuer: &str) -> Cow<'_, str> {
	if issuer.contains(ISSUER_HOST_MISRENDERED) {
		Cow::Owned(issuer.replacen(ISSUER_HOST_MISRENDERED, ISSUER_HOST, 1))
	} else {
		Cow::Borrowed(issuer)
	}
}

/// Validate claims against `provider` at the current time.
///
/// Returns the claims unchanged on success.
///
/// # Errors
///
/// Returns [`AuthError::TokenValidation`] with one of `Missing required claim: <name>`,
/// `Token has expired`, `Invalid issuer` or `Invalid audience`.
pub fn validate_claims(claims: Claims, provider: &IdentityProvider) -> Result<Claims> {
	validate_claims_at(claims, provider, Utc::now().timestamp())
}

/// Validate claims against `provider` as of `now` (epoch seconds).
pub fn validate_claims_at(claims: Claims, provider: &IdentityProvider, now: i64) -> Result<Claims> {
	let present = [
		claims.sub.is_some(),
		claims.exp.is_some(),
		claims.iss.is_some(),
		claims.aud.is_some(),
	];
	if let Some((name, _)) = REQUIRED_CLAIMS
		.iter()
		.zip(present)
		.find(|(_, present)| !present)
	{
		return Err(AuthError::validation(format!(
			"Missing required claim: {name}"
		)));
	}

	if claims.exp.map_or(true, |exp| exp <= now) {
		return Err(AuthError::validation("Token has expired"));
	}

	let issuer = claims.iss.as_deref().unwrap_or_default();
	if normalize_issuer(issuer) != provider.issuer() {
		return Err(AuthError::validation("Invalid issuer"));
	}

	if claims.aud.as_deref() != Some(provider.client_id.as_str()) {
		return Err(AuthError::validation("Invalid audience"));
	}

	Ok(claims)
}
