//! Error types for the gateway client
//!
//! Every failure the client can produce is one of the variants below. The
//! client never retries and never swallows: each error is returned to the
//! caller, carrying the serialized request and the raw response bytes where
//! they were available, so failed calls can be reproduced and diagnosed.
//!
//! # Error Categories
//!
//! - **Transport**: the request could not be sent or the body could not be read
//! - **Serialization**: a request could not be encoded or a response decoded
//! - **Gateway**: the remote gateway rejected the operation (fatal or soft)
//! - **ReversalRejected**: a split refund came back neither approved nor success
//! - **SignatureMismatch**: an inbound payload failed re-verification
//! - **SplitAllocation**: the split reconciliation invariant was violated
//! - **Configuration / OrderNotCaptured**: local preconditions failed before
//!   any network call was made

use thiserror::Error;

/// Internal code for HTTP/transport failures
pub const CODE_TRANSPORT: i64 = 800;
/// Internal code for request/response (de)serialization failures
pub const CODE_SERIALIZATION: i64 = 801;
/// Internal code for gateway business failures
pub const CODE_GATEWAY: i64 = 802;
/// Internal code for a split refund whose reversal status is neither
/// `success` nor `approved`
pub const CODE_REVERSAL: i64 = 803;

/// Main error type for the gateway client
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// Network or HTTP-level failure: the request could not be sent or the
    /// response body could not be read. A retry at a higher layer may be
    /// sensible; the client itself makes no retry decision.
    #[error("transport failure: {message}")]
    Transport {
        /// Description of the underlying failure
        message: String,
        /// Serialized request body, when it was built before the failure
        request: Option<String>,
    },

    /// The request could not be marshaled or the response envelope could not
    /// be deserialized.
    #[error("cannot decode gateway payload: {message}")]
    Serialization {
        /// Description of the (de)serialization failure
        message: String,
        /// Serialized request body, when available
        request: Option<String>,
        /// Raw response bytes, when available
        response: Option<Vec<u8>>,
    },

    /// The gateway rejected the operation at the business level.
    ///
    /// `fatal` distinguishes hard rejections (`response_status != success`)
    /// from soft failures riding along in a successful envelope
    /// (`response_code` + `response_description`).
    #[error("gateway rejected the operation ({code}): {message}")]
    Gateway {
        /// Canonical string form of the gateway error/response code
        code: String,
        /// Human-readable description from the gateway
        message: String,
        /// Whether the rejection is final for this request shape
        fatal: bool,
        /// Serialized request body, when available
        request: Option<String>,
        /// Raw response bytes, when available
        response: Option<Vec<u8>>,
    },

    /// A split refund completed, but its reversal status is neither
    /// `success` nor `approved`.
    #[error("split refund reversal is {status}: {description}")]
    ReversalRejected {
        /// The reverse status reported by the gateway
        status: String,
        /// The response description accompanying the status
        description: String,
    },

    /// An inbound payload failed signature re-verification.
    ///
    /// Callers decide whether to trust the payload regardless; logging-only
    /// call sites are expected.
    #[error("signature mismatch: payload carries {expected}, computed {computed}")]
    SignatureMismatch {
        /// The signature carried by the payload
        expected: String,
        /// The digest recomputed from the payload fields
        computed: String,
    },

    /// The per-receiver allocation of a split settlement did not sum back to
    /// the source amount. No settlement request is sent when this happens.
    #[error(
        "split allocation for order {order_id} does not reconcile: allocated {allocated} of {total} minor units"
    )]
    SplitAllocation {
        /// The order the allocation was computed for
        order_id: String,
        /// Source amount in minor units
        total: i64,
        /// Sum of the computed receiver shares
        allocated: i64,
    },

    /// The order a split settlement was requested for has not been captured.
    #[error("order {order_id} is not captured, cannot settle")]
    OrderNotCaptured {
        /// The order that failed the capture gate
        order_id: String,
    },

    /// A local precondition on the merchant configuration failed: a
    /// non-technical account attempted a split, split accounts are missing,
    /// or their percentages do not sum to 100.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the violated precondition
        message: String,
    },
}

impl GatewayError {
    /// Create a transport error without request context
    pub fn transport(message: impl Into<String>) -> Self {
        GatewayError::Transport {
            message: message.into(),
            request: None,
        }
    }

    /// Create a serialization error without request/response context
    pub fn serialization(message: impl Into<String>) -> Self {
        GatewayError::Serialization {
            message: message.into(),
            request: None,
            response: None,
        }
    }

    /// Create a fatal gateway error from a numeric error code
    pub fn fatal_gateway(code: i64, message: impl Into<String>) -> Self {
        GatewayError::Gateway {
            code: code.to_string(),
            message: message.into(),
            fatal: true,
            request: None,
            response: None,
        }
    }

    /// Create a non-fatal (soft) gateway error from a canonical code string
    pub fn soft_gateway(code: impl Into<String>, message: impl Into<String>) -> Self {
        GatewayError::Gateway {
            code: code.into(),
            message: message.into(),
            fatal: false,
            request: None,
            response: None,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        GatewayError::Configuration {
            message: message.into(),
        }
    }

    /// Attach the serialized request body for diagnostics
    pub fn with_request(mut self, body: &[u8]) -> Self {
        let rendered = String::from_utf8_lossy(body).into_owned();
        match &mut self {
            GatewayError::Transport { request, .. }
            | GatewayError::Serialization { request, .. }
            | GatewayError::Gateway { request, .. } => *request = Some(rendered),
            _ => {}
        }
        self
    }

    /// Attach the raw response bytes for diagnostics
    pub fn with_response(mut self, raw: &[u8]) -> Self {
        match &mut self {
            GatewayError::Serialization { response, .. }
            | GatewayError::Gateway { response, .. } => *response = Some(raw.to_vec()),
            _ => {}
        }
        self
    }

    /// Whether a retry of the same request shape is pointless
    ///
    /// Transport failures are the one class where a higher-layer retry is
    /// usually sensible; everything else is final for this request.
    pub fn is_fatal(&self) -> bool {
        match self {
            GatewayError::Transport { .. } => false,
            GatewayError::Gateway { fatal, .. } => *fatal,
            _ => true,
        }
    }

    /// Fixed internal code of the failure class, when one is reserved
    pub fn internal_code(&self) -> Option<i64> {
        match self {
            GatewayError::Transport { .. } => Some(CODE_TRANSPORT),
            GatewayError::Serialization { .. } => Some(CODE_SERIALIZATION),
            GatewayError::Gateway { .. } => Some(CODE_GATEWAY),
            GatewayError::ReversalRejected { .. } => Some(CODE_REVERSAL),
            _ => None,
        }
    }
}
