//! Authorization header helpers shared by servers and clients.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Value of the `Authorization` header for HTTP basic auth.
pub fn basic_auth_token(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}
