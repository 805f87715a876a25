// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and authorization for the wheel server.
//!
//! # Architecture
//!
//! ```text
//! bearer token → claims (decode) → validation → Identity
//!      → directory lookup (skipped for deployment admins)
//!      → PermissionSet → AuthorizationContext
//!      → GatewayAuthorizer (IAM policy) | AuthMiddleware (ApiRequest) → gates
//! ```
//!
//! - `claims` - unverified token payload decoding
//! - `validation` - expiry, issuer and audience checks
//! - `identity` - the caller identity derived from validated claims
//! - `directory` - the user directory collaborator and an in-memory store
//! - `permissions` - role to permission resolution
//! - `context` - the per-request authorization context
//! - `authorizer` - API gateway custom authorizer
//! - `middleware` - in-process request authentication
//! - `gate` - tower layers gating handlers on a permission
//!
//! Token signatures are not verified. Trust rests on claim validation plus the
//! transport delivering the token.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wheel_server_auth::{AuthMiddleware, IdentityProvider, MemoryDirectory, RequirePermission};
//!
//! let provider = IdentityProvider::new("us-west-2_AbCdEf", "client-id");
//! let middleware = Arc::new(AuthMiddleware::new(Some(provider), Arc::new(MemoryDirectory::new())));
//! let gate = RequirePermission::new(middleware, "create_wheel");
//! ```

pub mod authorizer;
pub mod claims;
pub mod context;
pub mod directory;
pub mod error;
pub mod gate;
pub mod identity;
pub mod middleware;
pub mod permissions;
pub mod request;
pub mod types;
pub mod validation;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use authorizer::{
	build_policy, wildcard_resource, AuthorizerEvent, AuthorizerResponse, Effect, GatewayAuthorizer,
	PolicyDocument, PolicyStatement,
};
pub use claims::{decode_token, Claims};
pub use context::{build_context, stringify_context, AuthorizationContext};
pub use directory::{
	lookup_membership, DirectorySeed, MemoryDirectory, TenantMembership, UserDirectory, UserRecord,
	WheelGroupRecord,
};
pub use error::{AuthError, DirectoryError, Result};
pub use gate::{Authenticate, RequirePermission};
pub use identity::Identity;
pub use middleware::{extract_bearer_token, AuthMiddleware};
pub use permissions::{resolve, resolve_names, PermissionSet};
pub use request::{ApiRequest, ApiResponse, UserInfo};
pub use types::{Permission, Role, UserId, WheelGroupId};
pub use validation::{validate_claims, IdentityProvider};
