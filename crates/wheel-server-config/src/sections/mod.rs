// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections. Each has a partial `*ConfigLayer` for merging and a
//! resolved `*Config`.

mod auth;
mod cognito;
mod directory;
mod http;
mod logging;

pub use auth::{AuthConfig, AuthConfigLayer, DEFAULT_SELF_IDENTITY_PATH};
pub use cognito::{CognitoConfig, CognitoConfigLayer};
pub use directory::{DirectoryConfig, DirectoryConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
