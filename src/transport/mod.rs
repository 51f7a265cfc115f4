//! Wire transport abstraction
//!
//! The gateway client never talks HTTP directly: it hands a [`WireRequest`]
//! to a [`Sender`] and gets raw bytes back. The production implementation is
//! [`HttpSender`](http::HttpSender); tests substitute a mock.

pub mod http;

use crate::types::error::GatewayError;
use async_trait::async_trait;

/// Protocol version header of an exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    /// Value of the `X-API-Version` header
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "1.0",
            ApiVersion::V2 => "2.0",
        }
    }
}

/// One fully prepared outbound exchange
#[derive(Debug, Clone)]
pub struct WireRequest {
    /// Absolute URL of the endpoint
    pub url: String,
    /// Serialized request envelope
    pub body: Vec<u8>,
    /// Correlation id carried as `X-Request-ID`
    pub request_id: String,
    /// Protocol version carried as `X-API-Version`
    pub api_version: ApiVersion,
}

/// Transport that posts a prepared request and returns the raw reply
///
/// Implementations return the body bytes verbatim. Gateway failures are
/// reported inside the body, not via HTTP status, so the transport never
/// inspects the status line.
#[async_trait]
pub trait Sender: Send + Sync {
    /// Post the request and read the full response body
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] when the request cannot be sent
    /// or the body cannot be read.
    async fn send(&self, request: &WireRequest) -> Result<Vec<u8>, GatewayError>;
}
