//! /ping and /windows handlers.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::response::Response;

use waypost_core::WindowSettings;

use super::{authorize, json_response, ApiError, ApiState};

// ── /ping ─────────────────────────────────────────────────────────────────────

pub async fn handle_ping(
    State(state): State<ApiState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<(), ApiError> {
    authorize(&state, &headers, peer, "/ping")
}

// ── /windows ──────────────────────────────────────────────────────────────────

pub async fn handle_windows_get(
    State(state): State<ApiState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    authorize(&state, &headers, peer, "/windows")?;
    json_response(&WindowSettings::from(state.registry.windows()))
}

pub async fn handle_windows_put(
    State(state): State<ApiState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    authorize(&state, &headers, peer, "/windows")?;
    let update: WindowSettings = serde_json::from_slice(&body).map_err(|_| {
        tracing::warn!(%peer, "bad windows body");
        ApiError::Validation("failed to read request body")
    })?;

    let windows = state.registry.update_windows(
        update.active_window_secs.map(Duration::from_secs),
        update.retention_window_secs.map(Duration::from_secs),
    );
    tracing::info!(
        active_secs = windows.active.as_secs(),
        retention_secs = windows.retention.as_secs(),
        "registry windows updated"
    );
    if !windows.is_ordered() {
        tracing::warn!("active window exceeds retention window");
    }
    json_response(&WindowSettings::from(windows))
}
