//! Inbound response envelopes
//!
//! Every v1 reply arrives wrapped as `{"response": {...}}`. The inner
//! object is either a full [`Order`](crate::types::order::Order) snapshot
//! (status, recurring, reverse, capture) or the slimmer checkout shape that
//! only carries a URL.

use crate::types::order::Order;
use crate::types::status::ResponseStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gateway response code, polymorphic on the wire
///
/// Historic gateway versions deliver the same field as a string, an
/// integer, or a float; all three normalize to one canonical string via
/// [`ResponseCode::canonical`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseCode {
    Text(String),
    Int(i64),
    Float(f64),
}

impl ResponseCode {
    /// Canonical string form used for error reporting and comparisons
    ///
    /// Floats render without a fractional part because the gateway only
    /// ever emits whole-number codes through that representation.
    pub fn canonical(&self) -> String {
        match self {
            ResponseCode::Text(code) => code.clone(),
            ResponseCode::Int(code) => code.to_string(),
            ResponseCode::Float(code) => format!("{code:.0}"),
        }
    }

    /// Whether the code field is present but carries no actual code
    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseCode::Text(code) if code.is_empty())
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// `{"response": {...}}` envelope around a full order snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct StatusEnvelope {
    pub response: Order,
}

/// Inner object of a checkout URL response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutResponse {
    #[serde(default)]
    pub response_status: Option<ResponseStatus>,
    #[serde(default)]
    pub checkout_url: Option<String>,
    #[serde(default)]
    pub payment_id: Option<i64>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub response_code: Option<ResponseCode>,
    #[serde(default)]
    pub response_description: Option<String>,
}

/// `{"response": {...}}` envelope around a checkout response
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutEnvelope {
    pub response: CheckoutResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::string(r#""1013""#, "1013")]
    #[case::integer("1013", "1013")]
    #[case::float("1013.0", "1013")]
    #[case::text(r#""card_declined""#, "card_declined")]
    fn response_code_normalizes_every_wire_shape(#[case] wire: &str, #[case] canonical: &str) {
        let code: ResponseCode = serde_json::from_str(wire).unwrap();
        assert_eq!(code.canonical(), canonical);
    }

    #[test]
    fn empty_string_code_counts_as_absent() {
        assert!(ResponseCode::Text(String::new()).is_empty());
        assert!(!ResponseCode::Int(0).is_empty());
    }

    #[test]
    fn status_envelope_unwraps_the_order() {
        let envelope: StatusEnvelope = serde_json::from_str(
            r#"{"response":{"order_status":"approved","amount":"1000"}}"#,
        )
        .unwrap();
        assert_eq!(envelope.response.real_amount(), 10.0);
    }

    #[test]
    fn checkout_envelope_decodes_success_and_failure_shapes() {
        let ok: CheckoutEnvelope = serde_json::from_str(
            r#"{"response":{"response_status":"success","checkout_url":"https://pay.example/u/1"}}"#,
        )
        .unwrap();
        assert_eq!(ok.response.response_status, Some(ResponseStatus::Success));
        assert_eq!(
            ok.response.checkout_url.as_deref(),
            Some("https://pay.example/u/1")
        );

        let failed: CheckoutEnvelope = serde_json::from_str(
            r#"{"response":{"response_status":"failure","error_code":1013,"error_message":"invalid signature"}}"#,
        )
        .unwrap();
        assert_eq!(failed.response.error_code, Some(1013));
    }
}
