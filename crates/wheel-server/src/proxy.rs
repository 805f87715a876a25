// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Conversion between HTTP messages and the gateway-proxy request shape.
//!
//! HTTP header names arrive lower-cased, so an HTTP caller's `Authorization`
//! header is always seen as `authorization`, whatever casing was sent. The
//! exact two-casing header rule (`Authorization` or `authorization`, nothing
//! else) only applies to gateway-proxy events, whose header maps keep the
//! casing the gateway delivered.

use std::collections::HashMap;
use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{Query, Request};
use axum::response::Response;
use http::header::{HeaderName, HeaderValue};
use tower::{Service, ServiceExt};
use wheel_server_auth::{ApiRequest, ApiResponse};

use crate::error::ServerError;

const MAX_BODY_BYTES: usize = 64 * 1024;

pub async fn from_http(request: Request) -> Result<ApiRequest, ServerError> {
	let (parts, body) = request.into_parts();

	let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
		.await
		.map_err(|e| ServerError::BadRequest(e.to_string()))?;
	let body = if bytes.is_empty() {
		None
	} else {
		Some(String::from_utf8_lossy(&bytes).into_owned())
	};

	let headers = parts
		.headers
		.iter()
		.filter_map(|(name, value)| {
			value
				.to_str()
				.ok()
				.map(|value| (name.as_str().to_string(), value.to_string()))
		})
		.collect();

	let query_string_parameters = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
		.map(|Query(query)| query)
		.unwrap_or_default();

	Ok(ApiRequest {
		path: parts.uri.path().to_string(),
		http_method: parts.method.as_str().to_string(),
		headers,
		query_string_parameters,
		body,
		..ApiRequest::default()
	})
}

pub fn into_http(response: ApiResponse) -> Response {
	let status = response.status();
	let mut http_response = Response::new(Body::from(response.body));
	*http_response.status_mut() = status;

	let headers = http_response.headers_mut();
	for (name, value) in &response.headers {
		match (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			(Ok(name), Ok(value)) => {
				headers.insert(name, value);
			}
			_ => tracing::warn!(header = %name, "dropping invalid response header"),
		}
	}

	http_response
}

/// Convert `request`, run it through `service` and convert the answer back.
pub async fn dispatch<S>(service: S, request: Request) -> Response
where
	S: Service<ApiRequest, Response = ApiResponse, Error = Infallible>,
{
	let api_request = match from_http(request).await {
		Ok(api_request) => api_request,
		Err(e) => return axum::response::IntoResponse::into_response(e),
	};

	match service.oneshot(api_request).await {
		Ok(response) => into_http(response),
		Err(never) => match never {},
	}
}
