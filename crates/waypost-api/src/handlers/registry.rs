//! /register, /deregister, /discover, /list handlers.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;

use waypost_core::ServiceList;

use super::{authorize, json_response, parse_registration, ApiError, ApiState};

// ── /register (POST) ──────────────────────────────────────────────────────────

pub async fn handle_register(
    State(state): State<ApiState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(), ApiError> {
    authorize(&state, &headers, peer, "/register")?;
    let record = parse_registration(&body, peer)?;
    state.registry.add(&record);
    Ok(())
}

// ── /deregister (DELETE) ──────────────────────────────────────────────────────

pub async fn handle_deregister(
    State(state): State<ApiState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(), ApiError> {
    authorize(&state, &headers, peer, "/deregister")?;
    let record = parse_registration(&body, peer)?;
    state.registry.remove(&record);
    tracing::debug!(name = %record.name, host = %record.host, "service deregistered");
    Ok(())
}

/// Query parameters as a plain map. Never rejects, so `authorize` always
/// runs before anything about the query is judged. A query that cannot be
/// decoded counts as empty.
type Params = Result<Query<HashMap<String, String>>, QueryRejection>;

fn params(query: Params) -> HashMap<String, String> {
    query.map(|Query(map)| map).unwrap_or_default()
}

// ── /discover (GET) ───────────────────────────────────────────────────────────

pub async fn handle_discover(
    State(state): State<ApiState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    query: Params,
) -> Result<Response, ApiError> {
    authorize(&state, &headers, peer, "/discover")?;
    let params = params(query);
    let name = params.get("name").map(String::as_str).unwrap_or("");
    if name.is_empty() {
        tracing::warn!(%peer, "discover without a service name");
        return Err(ApiError::Validation("no service name provided"));
    }
    let record = state.registry.get(name)?;
    json_response(&record)
}

// ── /list (GET) ───────────────────────────────────────────────────────────────

/// `name` empty or absent lists every service. `active=true` restricts the
/// result to records inside the active window; any other value is ignored.
pub async fn handle_list(
    State(state): State<ApiState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    query: Params,
) -> Result<Response, ApiError> {
    authorize(&state, &headers, peer, "/list")?;
    let params = params(query);
    let name = params.get("name").map(String::as_str).unwrap_or("");
    let active_only = params.get("active").is_some_and(|v| v == "true");
    let services = state.registry.list(name, !active_only);
    json_response(&ServiceList { services })
}
