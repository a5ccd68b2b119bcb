use thiserror::Error;

/// Errors returned by every client call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network failure or timeout talking to the registry.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The registry answered with a non-200 status; `message` is its body.
    #[error("registry returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// A 200 response whose body was not the expected JSON.
    #[error("failed to decode registry response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("invalid registry url: {0}")]
    InvalidUrl(String),

    /// The construction-time ping failed.
    #[error("failed to connect to registry at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// HTTP status of a remote rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Remote { status, .. } => Some(*status),
            ClientError::Connect { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
