//! HTTP API handlers. Each one authorizes, then translates the request into a registry call.

pub mod registry;
pub mod status;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use waypost_core::ServiceRecord;
use waypost_registry::{Authenticator, Registry, RegistryError};

#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<dyn Registry>,
    pub auth: Arc<dyn Authenticator>,
}

impl ApiState {
    pub fn new(registry: Arc<dyn Registry>, auth: Arc<dyn Authenticator>) -> Self {
        Self { registry, auth }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("unauthorized")]
    Unauthorized,
    #[error("method not supported")]
    MethodNotAllowed,
    #[error("service not found")]
    NotFound(#[from] RegistryError),
    #[error("failed to write response")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Serialization(e) = &self {
            tracing::error!(error = %e, "failed to encode response body");
        }
        (self.status(), self.to_string()).into_response()
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Reject the request unless the authenticator accepts its Authorization header.
fn authorize(
    state: &ApiState,
    headers: &HeaderMap,
    peer: SocketAddr,
    route: &'static str,
) -> Result<(), ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if state.auth.authenticate(token) {
        Ok(())
    } else {
        tracing::warn!(%peer, route, "unauthorized request");
        Err(ApiError::Unauthorized)
    }
}

/// Wire shape of register/deregister bodies. `added` and any other fields
/// are accepted and ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegistrationBody {
    name: String,
    host: String,
}

/// Decode a `{name, host}` body; both must be present and non-empty.
fn parse_registration(body: &[u8], peer: SocketAddr) -> Result<ServiceRecord, ApiError> {
    let parsed: Option<RegistrationBody> = serde_json::from_slice(body).ok();
    match parsed {
        Some(RegistrationBody { name, host }) if !name.is_empty() && !host.is_empty() => {
            Ok(ServiceRecord::new(name, host))
        }
        _ => {
            tracing::warn!(%peer, "bad request body");
            Err(ApiError::Validation("failed to read request body"))
        }
    }
}

/// Serialize `value` as an application/json 200 response.
fn json_response<T: Serialize>(value: &T) -> Result<Response, ApiError> {
    let body = serde_json::to_vec(value)?;
    Ok(([(CONTENT_TYPE, "application/json")], body).into_response())
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

// Re-export handler functions for use in router setup.
pub use registry::{handle_deregister, handle_discover, handle_list, handle_register};
pub use status::{handle_ping, handle_windows_get, handle_windows_put};
