// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, a TOML file and environment variables.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	AuthConfigLayer, CognitoConfigLayer, DirectoryConfigLayer, HttpConfigLayer, LogFormat,
	LoggingConfigLayer,
};

pub const SYSTEM_CONFIG_PATH: &str = "/etc/wheel/server.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults. Every default lives in the section `finalize`, so this
/// layer is empty.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file source. A missing file contributes nothing.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `WHEEL_SERVER_<SECTION>_<FIELD>`. The user pool and client id
/// also fall back to the bare `COGNITO_USER_POOL_ID` and `COGNITO_CLIENT_ID`.
pub struct EnvSource {
	vars: Option<HashMap<String, String>>,
}

impl EnvSource {
	/// Read the process environment.
	pub fn new() -> Self {
		Self { vars: None }
	}

	/// Read a fixed set of variables instead of the process environment.
	pub fn from_vars<I, K, V>(vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			vars: Some(
				vars
					.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}

	fn var(&self, name: &str) -> Option<String> {
		let value = match &self.vars {
			Some(vars) => vars.get(name).cloned(),
			None => std::env::var(name).ok(),
		};
		value.filter(|s| !s.is_empty())
	}

	fn u16(&self, name: &str) -> Result<Option<u16>, ConfigError> {
		match self.var(name) {
			Some(v) => v.trim().parse().map(Some).map_err(|_| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid u16 value '{v}'"),
			}),
			None => Ok(None),
		}
	}

	fn http(&self) -> Result<HttpConfigLayer, ConfigError> {
		Ok(HttpConfigLayer {
			host: self.var("WHEEL_SERVER_HTTP_HOST"),
			port: self.u16("WHEEL_SERVER_HTTP_PORT")?,
		})
	}

	fn cognito(&self) -> CognitoConfigLayer {
		CognitoConfigLayer {
			user_pool_id: self
				.var("WHEEL_SERVER_COGNITO_USER_POOL_ID")
				.or_else(|| self.var("COGNITO_USER_POOL_ID")),
			client_id: self
				.var("WHEEL_SERVER_COGNITO_CLIENT_ID")
				.or_else(|| self.var("COGNITO_CLIENT_ID")),
			region: self.var("WHEEL_SERVER_COGNITO_REGION"),
		}
	}

	fn auth(&self) -> AuthConfigLayer {
		AuthConfigLayer {
			self_identity_path: self.var("WHEEL_SERVER_AUTH_SELF_IDENTITY_PATH"),
		}
	}

	fn directory(&self) -> DirectoryConfigLayer {
		DirectoryConfigLayer {
			seed_path: self.var("WHEEL_SERVER_DIRECTORY_SEED_PATH"),
		}
	}

	fn logging(&self) -> LoggingConfigLayer {
		LoggingConfigLayer {
			level: self.var("WHEEL_SERVER_LOGGING_LEVEL"),
			format: self
				.var("WHEEL_SERVER_LOGGING_FORMAT")
				.map(|v| LogFormat::from_name(&v)),
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(self.http()?),
			cognito: Some(self.cognito()),
			auth: Some(self.auth()),
			directory: Some(self.directory()),
			logging: Some(self.logging()),
		})
	}
}
