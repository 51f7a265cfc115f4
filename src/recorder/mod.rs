//! Best-effort capture of gateway traffic
//!
//! A [`Recorder`] receives every outbound body, inbound body, transport
//! error, and per-call metrics map, keyed by the `X-Request-ID` of the
//! exchange. Recording is strictly best-effort: the client logs recorder
//! failures and carries on, so a broken sink can never fail a payment.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, error, info};

/// Free-form tag set attached to every record (e.g. `order_id`)
pub type Tags = HashMap<String, String>;

/// Failure inside a recording sink
#[derive(Debug, Error)]
#[error("recorder failure: {message}")]
pub struct RecorderError {
    pub message: String,
}

impl RecorderError {
    pub fn new(message: impl Into<String>) -> Self {
        RecorderError {
            message: message.into(),
        }
    }
}

/// Sink for request/response traffic and per-call metrics
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Record an outbound request body
    async fn record_request(
        &self,
        order_id: Option<&str>,
        request_id: &str,
        body: &[u8],
        tags: &Tags,
    ) -> Result<(), RecorderError>;

    /// Record an inbound response body
    async fn record_response(
        &self,
        order_id: Option<&str>,
        request_id: &str,
        body: &[u8],
        tags: &Tags,
    ) -> Result<(), RecorderError>;

    /// Record a transport failure
    async fn record_error(
        &self,
        order_id: Option<&str>,
        request_id: &str,
        error: &str,
        tags: &Tags,
    ) -> Result<(), RecorderError>;

    /// Record per-call metrics (url, timestamps, duration)
    async fn record_metrics(
        &self,
        order_id: Option<&str>,
        request_id: &str,
        metrics: &Tags,
        tags: &Tags,
    ) -> Result<(), RecorderError>;
}

/// Recorder that forwards everything to the `tracing` subscriber
///
/// Useful as a development default and in tests; production deployments
/// usually plug in a persistent sink instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRecorder;

#[async_trait]
impl Recorder for LogRecorder {
    async fn record_request(
        &self,
        order_id: Option<&str>,
        request_id: &str,
        body: &[u8],
        _tags: &Tags,
    ) -> Result<(), RecorderError> {
        debug!(
            request_id,
            order_id = order_id.unwrap_or(""),
            body = %String::from_utf8_lossy(body),
            "gateway request"
        );
        Ok(())
    }

    async fn record_response(
        &self,
        order_id: Option<&str>,
        request_id: &str,
        body: &[u8],
        _tags: &Tags,
    ) -> Result<(), RecorderError> {
        debug!(
            request_id,
            order_id = order_id.unwrap_or(""),
            body = %String::from_utf8_lossy(body),
            "gateway response"
        );
        Ok(())
    }

    async fn record_error(
        &self,
        order_id: Option<&str>,
        request_id: &str,
        error: &str,
        _tags: &Tags,
    ) -> Result<(), RecorderError> {
        error!(
            request_id,
            order_id = order_id.unwrap_or(""),
            error,
            "gateway transport failure"
        );
        Ok(())
    }

    async fn record_metrics(
        &self,
        order_id: Option<&str>,
        request_id: &str,
        metrics: &Tags,
        _tags: &Tags,
    ) -> Result<(), RecorderError> {
        info!(
            request_id,
            order_id = order_id.unwrap_or(""),
            ?metrics,
            "gateway call metrics"
        );
        Ok(())
    }
}
