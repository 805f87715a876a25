// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for the wheel server.
//!
//! Sources, highest precedence first:
//!
//! 1. Environment variables (`WHEEL_SERVER_*`, plus `COGNITO_USER_POOL_ID` /
//!    `COGNITO_CLIENT_ID`)
//! 2. Config file (`/etc/wheel/server.toml` unless overridden)
//! 3. Built-in defaults
//!
//! # Usage
//!
//! ```ignore
//! use wheel_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info, warn};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
	pub http: HttpConfig,
	/// `None` when the user pool or client id is missing.
	pub cognito: Option<CognitoConfig>,
	pub auth: AuthConfig,
	pub directory: DirectoryConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from defaults, the system config file and the environment.
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource::new()),
	])
}

/// Load configuration from the environment only.
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![Box::new(DefaultsSource), Box::new(EnvSource::new())])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource::new()),
	])
}

/// Merge `sources` in precedence order and resolve the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let cognito_layer = layer.cognito.unwrap_or_default();
	if cognito_layer.is_partial() {
		warn!("only one of user pool id and client id is set, identity provider disabled");
	}

	let config = ServerConfig {
		http: layer.http.unwrap_or_default().finalize(),
		cognito: cognito_layer.finalize(),
		auth: layer.auth.unwrap_or_default().finalize(),
		directory: layer.directory.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize(),
	};

	validate_config(&config)?;

	if config.cognito.is_none() {
		warn!("identity provider not configured, all requests will be denied");
	}

	info!(
		host = %config.http.host,
		port = config.http.port,
		identity_provider_configured = config.cognito.is_some(),
		self_identity_path = %config.auth.self_identity_path,
		directory_seeded = config.directory.seed_path.is_some(),
		"Server configuration loaded"
	);

	Ok(config)
}

const ROUTE_PATTERN_CHARS: [char; 4] = [':', '*', '{', '}'];

/// Validate cross-field configuration rules.
fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
	if !config.auth.self_identity_path.starts_with('/') {
		return Err(ConfigError::Validation(format!(
			"auth.self_identity_path must be an absolute path, got '{}'",
			config.auth.self_identity_path
		)));
	}

	// Route syntax never matches the middleware's exact path comparison.
	if let Some(c) = config
		.auth
		.self_identity_path
		.chars()
		.find(|c| ROUTE_PATTERN_CHARS.contains(c))
	{
		return Err(ConfigError::Validation(format!(
			"auth.self_identity_path must be a literal path, found '{c}' in '{}'",
			config.auth.self_identity_path
		)));
	}

	if config.logging.level.trim().is_empty() {
		return Err(ConfigError::Validation(
			"logging.level must not be empty".to_string(),
		));
	}

	Ok(())
}
