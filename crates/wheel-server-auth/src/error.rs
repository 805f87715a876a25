// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

/// Failures along the token → identity → directory pipeline.
///
/// Messages are kept distinct for diagnostics and unit tests. The entry points
/// in [`crate::authorizer`] and [`crate::middleware`] collapse them into
/// generic client-facing responses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
	#[error("Invalid token format: {0}")]
	TokenFormat(String),

	#[error("{0}")]
	TokenValidation(String),

	#[error("Token missing required claims")]
	MissingIdentityClaims,

	#[error("User not found in database: {0}")]
	UserNotFound(String),

	#[error("Failed to lookup user wheel group info: {0}")]
	Lookup(String),

	#[error("Identity provider not configured: {0}")]
	NotConfigured(&'static str),
}

impl AuthError {
	pub(crate) fn validation(message: impl Into<String>) -> Self {
		AuthError::TokenValidation(message.into())
	}

	pub(crate) fn format(message: impl Into<String>) -> Self {
		AuthError::TokenFormat(message.into())
	}
}

/// Faults raised by a [`crate::directory::UserDirectory`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
	#[error("Storage error: {0}")]
	Storage(String),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AuthError>;
