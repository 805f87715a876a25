// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP surface for wheel authorization.
//!
//! - `POST /authorize` answers API gateway TOKEN events with an IAM policy
//! - `GET <self identity path>` returns the caller's authorization context
//! - `GET /app/api/v2/auth/permissions` lists the caller's granted permissions
//! - `GET /health` reports liveness

pub mod api;
pub mod error;
pub mod proxy;
pub mod routes;

pub use api::{create_app_state, create_router, AppState};
pub use error::ServerError;
