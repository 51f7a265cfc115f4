//! HTTP transport backed by `reqwest`

use crate::config::GatewayConfig;
use crate::transport::{Sender, WireRequest};
use crate::types::error::GatewayError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use tracing::debug;

const CLIENT_USER_AGENT: &str = concat!("cardgate/", env!("CARGO_PKG_VERSION"));

/// Production [`Sender`] posting JSON over a pooled HTTPS client
///
/// Response bodies are returned verbatim regardless of HTTP status; the
/// gateway reports failures inside the envelope. Gzip-encoded replies
/// (the 2.0 settlement surface uses them) are decompressed transparently
/// by the underlying client.
pub struct HttpSender {
    client: reqwest::Client,
}

impl HttpSender {
    /// Build a sender with the pool and timeout settings from the config
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] when the underlying client
    /// cannot be constructed.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .tcp_keepalive(config.keep_alive)
            .pool_idle_timeout(config.idle_timeout)
            .pool_max_idle_per_host(config.max_idle_connections)
            .build()
            .map_err(|e| GatewayError::configuration(format!("cannot build http client: {e}")))?;
        Ok(HttpSender { client })
    }

    fn headers(request: &WireRequest) -> Result<HeaderMap, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-Request-ID",
            HeaderValue::from_str(&request.request_id)
                .map_err(|e| GatewayError::transport(format!("invalid request id: {e}")))?,
        );
        headers.insert(
            "X-API-Version",
            HeaderValue::from_static(request.api_version.as_str()),
        );
        Ok(headers)
    }
}

#[async_trait]
impl Sender for HttpSender {
    async fn send(&self, request: &WireRequest) -> Result<Vec<u8>, GatewayError> {
        debug!(
            url = %request.url,
            request_id = %request.request_id,
            api_version = request.api_version.as_str(),
            "posting gateway request"
        );

        let response = self
            .client
            .post(&request.url)
            .headers(Self::headers(request)?)
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| {
                GatewayError::transport(format!("cannot send request: {e}"))
                    .with_request(&request.body)
            })?;

        let raw = response.bytes().await.map_err(|e| {
            GatewayError::transport(format!("cannot read response: {e}"))
                .with_request(&request.body)
        })?;

        Ok(raw.to_vec())
    }
}
