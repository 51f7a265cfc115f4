//! Wire-level enumerations shared by requests and responses
//!
//! These mirror the exact lowercase string values the gateway puts on the
//! wire. The top-level [`OrderStatus`] is the order lifecycle state;
//! [`CaptureStatus`] and [`ReverseStatus`] are orthogonal sub-states layered
//! on top of it (an order can be `approved` at the top level while
//! independently `captured` or still `hold`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order registered, nothing processed yet
    Created,
    /// Payment is in flight at the gateway or issuing bank
    Processing,
    /// Charge or hold approved by the issuer
    Approved,
    /// Rejected by the gateway, bank, or external payment system
    Declined,
    /// Order lifetime elapsed without completion
    Expired,
    /// Canceled before processing
    Canceled,
    /// A previously approved charge/hold was reversed
    Reversed,
    /// Funds were captured (finalized)
    Captured,
}

impl OrderStatus {
    /// Wire representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Processing => "processing",
            OrderStatus::Approved => "approved",
            OrderStatus::Declined => "declined",
            OrderStatus::Expired => "expired",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Reversed => "reversed",
            OrderStatus::Captured => "captured",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capture sub-state of an approved order
///
/// Carried in the nested additional-info structure of status responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureStatus {
    /// Funds are reserved but not settled
    Hold,
    /// The hold has been converted into a finalized charge
    Captured,
}

impl CaptureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureStatus::Hold => "hold",
            CaptureStatus::Captured => "captured",
        }
    }
}

impl fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reversal processing sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReverseStatus {
    /// Reversal has been registered but not processed yet
    Created,
    /// Reversal was declined by the gateway, bank, or payment system
    Declined,
    /// Reversal completed successfully
    Approved,
    /// Legacy alias some settlement responses use instead of `approved`
    Success,
}

impl ReverseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReverseStatus::Created => "created",
            ReverseStatus::Declined => "declined",
            ReverseStatus::Approved => "approved",
            ReverseStatus::Success => "success",
        }
    }

    /// Whether the reversal went through (either modern or legacy spelling)
    pub fn is_settled(&self) -> bool {
        matches!(self, ReverseStatus::Approved | ReverseStatus::Success)
    }
}

impl fmt::Display for ReverseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-level outcome reported inside a response envelope
///
/// `success` here only means the gateway accepted and processed the call;
/// a business-level soft failure can still ride along in `response_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Failure,
    /// Settlement responses report freshly registered orders as `created`
    Created,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Success => "success",
            ResponseStatus::Failure => "failure",
            ResponseStatus::Created => "created",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ISO-4217 currency code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    UAH,
    USD,
    EUR,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::UAH => "UAH",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gateway API endpoints
///
/// Endpoint paths are fixed by the gateway; the host they are joined to
/// comes from [`GatewayConfig`](crate::config::GatewayConfig) so tests can
/// point the client at a local stub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Hosted checkout URL creation (card verification links)
    CheckoutUrl,
    /// Order status lookup by order id
    OrderStatus,
    /// Token-based recurring payment (straight and preauth)
    Recurring,
    /// P2P credit (withdrawal to card)
    P2pCredit,
    /// Full or partial reversal
    Reverse,
    /// Capture of a previously held amount
    Capture,
    /// 3-D Secure step one for mobile container payments
    ThreeDsStep1,
    /// Split settlement (API version 2.0)
    Settlement,
    /// Identity / limit lookup for a client
    ClientStatus,
}

impl Endpoint {
    /// Path component of the endpoint, joined to the configured host
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::CheckoutUrl => "/api/checkout/url/",
            Endpoint::OrderStatus => "/api/status/order_id/",
            Endpoint::Recurring => "/api/recurring/",
            Endpoint::P2pCredit => "/api/p2pcredit/",
            Endpoint::Reverse => "/api/reverse/order_id/",
            Endpoint::Capture => "/api/capture/order_id/",
            Endpoint::ThreeDsStep1 => "/api/3dsecure_step1/",
            Endpoint::Settlement => "/api/settlement",
            Endpoint::ClientStatus => "/api/client/status/",
        }
    }

    /// Whether this endpoint lives on the checkout host rather than the API host
    pub fn uses_checkout_host(&self) -> bool {
        matches!(self, Endpoint::ThreeDsStep1 | Endpoint::Settlement)
    }
}
