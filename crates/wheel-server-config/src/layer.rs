// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The partial, mergeable form of [`crate::ServerConfig`].

use serde::{Deserialize, Serialize};

use crate::sections::{
	AuthConfigLayer, CognitoConfigLayer, DirectoryConfigLayer, HttpConfigLayer, LoggingConfigLayer,
};

/// One source's view of the configuration. Absent sections and fields leave
/// lower-precedence values in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub cognito: Option<CognitoConfigLayer>,
	#[serde(default)]
	pub auth: Option<AuthConfigLayer>,
	#[serde(default)]
	pub directory: Option<DirectoryConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl ServerConfigLayer {
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_section(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_section(&mut self.cognito, other.cognito, CognitoConfigLayer::merge);
		merge_section(&mut self.auth, other.auth, AuthConfigLayer::merge);
		merge_section(&mut self.directory, other.directory, DirectoryConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T>(base: &mut Option<T>, overlay: Option<T>, merge: fn(&mut T, T)) {
	let Some(overlay) = overlay else {
		return;
	};
	if let Some(base) = base.as_mut() {
		merge(base, overlay);
	} else {
		*base = Some(overlay);
	}
}
