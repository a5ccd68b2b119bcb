//! HTTP transport to a registry, plus the trait the registration agent
//! renews through.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use waypost_core::config::ClientConfig;
use waypost_core::{ServiceList, ServiceRecord, WindowSettings};

use crate::error::ClientError;

/// The two remote calls a registration agent needs.
#[async_trait]
pub trait RegistryTransport: Send + Sync {
    async fn register(&self, record: &ServiceRecord) -> Result<(), ClientError>;
    async fn deregister(&self, record: &ServiceRecord) -> Result<(), ClientError>;
}

/// reqwest-backed access to every registry route.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.registry_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> Result<Url, ClientError> {
        let raw = format!("{}/{}", self.base_url, route);
        Url::parse(&raw).map_err(|e| ClientError::InvalidUrl(format!("{raw}: {e}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let req = self.http.request(method, url);
        if self.token.is_empty() {
            req
        } else {
            req.header(AUTHORIZATION, self.token.as_str())
        }
    }

    /// Send and turn any non-200 answer into `ClientError::Remote`.
    async fn send(&self, req: RequestBuilder) -> Result<Response, ClientError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await?.trim().to_string();
        Err(ClientError::Remote {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
        resp.json::<T>().await.map_err(ClientError::Decode)
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        self.send(self.request(Method::GET, self.url("ping")?)).await?;
        Ok(())
    }

    /// One active record for `name`.
    pub async fn discover(&self, name: &str) -> Result<ServiceRecord, ClientError> {
        let mut url = self.url("discover")?;
        url.query_pairs_mut().append_pair("name", name);
        let resp = self.send(self.request(Method::GET, url)).await?;
        Self::decode(resp).await
    }

    /// Records for `name` (`""` = all). Inactive ones too unless `active_only`.
    pub async fn list(&self, name: &str, active_only: bool) -> Result<Vec<ServiceRecord>, ClientError> {
        let mut url = self.url("list")?;
        url.query_pairs_mut().append_pair("name", name);
        if active_only {
            url.query_pairs_mut().append_pair("active", "true");
        }
        let resp = self.send(self.request(Method::GET, url)).await?;
        let list: ServiceList = Self::decode(resp).await?;
        Ok(list.services)
    }

    pub async fn windows(&self) -> Result<WindowSettings, ClientError> {
        let resp = self.send(self.request(Method::GET, self.url("windows")?)).await?;
        Self::decode(resp).await
    }

    pub async fn set_windows(&self, update: &WindowSettings) -> Result<WindowSettings, ClientError> {
        let req = self.request(Method::PUT, self.url("windows")?).json(update);
        let resp = self.send(req).await?;
        Self::decode(resp).await
    }
}

#[async_trait]
impl RegistryTransport for HttpTransport {
    async fn register(&self, record: &ServiceRecord) -> Result<(), ClientError> {
        let req = self.request(Method::POST, self.url("register")?).json(record);
        self.send(req).await?;
        Ok(())
    }

    async fn deregister(&self, record: &ServiceRecord) -> Result<(), ClientError> {
        let req = self.request(Method::DELETE, self.url("deregister")?).json(record);
        self.send(req).await?;
        Ok(())
    }
}
