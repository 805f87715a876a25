// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bearer token decoding.
//!
//! A token is three `.`-separated URL-safe base64 segments (header, payload,
//! signature). [`decode_token`] checks the structure and parses the payload
//! into a typed [`Claims`] set.
//!
//! # Security Notes
//!
//! - The signature segment is decoded but NOT verified. Trust in the claims
//!   comes from [`crate::validation`] and from the transport in front of this
//!   service.
//! - Only the claims listed on [`Claims`] are read; every other key in the
//!   payload is ignored.
//! - Never log the token or the decoded payload.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};

/// Name of the identity-provider attribute that marks a deployment admin.
pub const DEPLOYMENT_ADMIN_CLAIM: &str = "custom:deployment_admin";

const TOKEN_SEGMENTS: usize = 3;
const SEGMENT_NAMES: [&str; TOKEN_SEGMENTS] = ["header", "payload", "signature"];

/// The claims this service reads from a token payload.
///
/// Every field is optional at decode time; [`crate::validation`] decides
/// which ones are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sub: Option<String>,
	/// Expiry, epoch seconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub exp: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iss: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub aud: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(
		rename = "cognito:username",
		default,
		skip_serializing_if = "Option::is_none"
	)]
	pub username: Option<String>,
	/// Raw `"true"`/`"false"` attribute. Read it through
	/// [`Claims::is_deployment_admin`].
	#[serde(
		rename = "custom:deployment_admin",
		default,
		skip_serializing_if = "Option::is_none"
	)]
	pub deployment_admin: Option<String>,
}

impl Claims {
	/// True iff the deployment-admin attribute, lower-cased, is exactly `"true"`.
	pub fn is_deployment_admin(&self) -> bool {
		self
			.deployment_admin
			.as_deref()
			.map(|value| value.to_lowercase() == "true")
			.unwrap_or(false)
	}
}

/// Decode a bearer token into its claim set without verifying the signature.
///
/// # Errors
///
/// Returns [`AuthError::TokenFormat`] when the token does not have exactly
/// three segments, when any segment is not URL-safe base64 (trailing `=`
/// padding is tolerated), or when the payload is not a JSON object.
pub fn decode_token(token: &str) -> Result<Claims> {
	let segments: Vec<&str> = token.split('.').collect();
	if segments.len() != TOKEN_SEGMENTS {
		return Err(AuthError::format(format!(
			"expected {TOKEN_SEGMENTS} segments, found {}",
			segments.len()
		)));
	}

	let mut decoded = Vec::with_capacity(TOKEN_SEGMENTS);
	for (segment, name) in segments.iter().zip(SEGMENT_NAMES) {
		decoded.push(decode_segment(segment, name)?);
	}

	serde_json::from_slice(&decoded[1])
		.map_err(|e| AuthError::format(format!("payload is not a valid claim set: {e}")))
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>> {
	URL_SAFE_NO_PAD
		.decode(segment.trim_end_matches('='))
		.map_err(|e| AuthError::format(format!("{name} segment is not valid base64url: {e}")))
}
