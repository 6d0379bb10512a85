use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;

use super::error::ApiError;
use super::transport::{ApiResponse, Transport};

/// Bitbucket Server API client using HTTP basic auth
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

/// HTTP connection settings
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub max_idle_connections: usize,
    pub idle_timeout: Duration,
    pub connection_timeout: Duration,
    pub request_timeout: Duration,
    pub tcp_keepalive: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_idle_connections: 10,
            idle_timeout: Duration::from_secs(90),
            connection_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            tcp_keepalive: Some(Duration::from_secs(30)),
        }
    }
}

impl ClientConfig {
    fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connection_timeout)
            .pool_idle_timeout(self.idle_timeout)
            .pool_max_idle_per_host(self.max_idle_connections);

        if let Some(keepalive) = self.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        builder.build()
    }
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(server: &str, username: &str, password: &str) -> Result<Self, ApiError> {
        Self::with_config(server, username, password, ClientConfig::default())
    }

    pub fn with_config(
        server: &str,
        username: &str,
        password: &str,
        config: ClientConfig,
    ) -> Result<Self, ApiError> {
        let parsed =
            url::Url::parse(server).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", server, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                server,
                parsed.scheme()
            )));
        }

        let http_client = config.build_client()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: server.trim_end_matches('/').to_string(),
                username: username.to_string(),
                password: password.to_string(),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }
}

#[async_trait]
impl Transport for Client {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);

        tracing::debug!("{} request to: {}", method, url);

        let mut request = self
            .inner
            .http_client
            .request(method.clone(), &url)
            .basic_auth(&self.inner.username, Some(&self.inner.password))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!("{} {} returned HTTP {}", method, path, status);

        Ok(ApiResponse { status, body })
    }
}
