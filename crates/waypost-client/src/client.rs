//! Discovery client.

use waypost_core::config::ClientConfig;
use waypost_core::ServiceRecord;

use crate::error::ClientError;
use crate::transport::HttpTransport;

/// Looks services up in a registry.
#[derive(Clone)]
pub struct Client {
    transport: HttpTransport,
}

impl Client {
    /// Build a client and ping the registry once; fails if it is unreachable
    /// or rejects the token.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config)?;
        transport.ping().await.map_err(|e| ClientError::Connect {
            url: transport.base_url().to_string(),
            source: Box::new(e),
        })?;
        Ok(Self { transport })
    }

    pub fn from_transport(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// Host of one active replica of `name`.
    pub async fn discover(&self, name: &str) -> Result<String, ClientError> {
        Ok(self.transport.discover(name).await?.host)
    }

    /// Full record of one active replica of `name`.
    pub async fn discover_record(&self, name: &str) -> Result<ServiceRecord, ClientError> {
        self.transport.discover(name).await
    }

    /// Every retained record for `name` (`""` = all services).
    pub async fn list(&self, name: &str) -> Result<Vec<ServiceRecord>, ClientError> {
        self.transport.list(name, false).await
    }

    /// Only the records currently inside the active window.
    pub async fn list_active(&self, name: &str) -> Result<Vec<ServiceRecord>, ClientError> {
        self.transport.list(name, true).await
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        self.transport.ping().await
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }
}
