//! Split-settlement wire objects (API version 2.0)
//!
//! The 2.0 surface wraps its payload differently from v1: the order object
//! is serialized, base64-encoded into an opaque `data` string, and the
//! signature covers `key|data` instead of per-field pairs. Responses carry
//! the same triple back; their signature covers the *decoded* payload text.

use crate::core::signature;
use crate::types::error::GatewayError;
use crate::types::status::{ResponseStatus, ReverseStatus};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize, Serializer};

/// Protocol version field of the 2.0 envelope
///
/// The gateway insists on a JSON *number* with a fractional digit (`2.0`,
/// not `2` and not `"2.0"`), which serde's default integer rendering would
/// break. Serialized through `serialize_f64` to keep the trailing `.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VersionTag(pub f64);

impl Serialize for VersionTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

/// Per-receiver settlement requisites
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requisites {
    /// Share routed to this receiver, in minor currency units
    pub amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_description: Option<String>,
    /// Receiving merchant identifier; the gateway accepts it as a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rectoken: Option<String>,
}

/// One settlement receiver
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Receiver {
    pub requisites: Requisites,
    #[serde(rename = "type")]
    pub receiver_type: String,
}

impl Receiver {
    /// A merchant-type receiver for the given share
    pub fn merchant(
        merchant_id: impl Into<String>,
        amount: i64,
        description: impl Into<String>,
    ) -> Self {
        Receiver {
            requisites: Requisites {
                amount,
                settlement_description: Some(description.into()),
                merchant_id: Some(merchant_id.into()),
                rectoken: None,
            },
            receiver_type: "merchant".to_string(),
        }
    }
}

/// One settlement transaction reported back per receiver
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettlementTransaction {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub merchant_id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub settlement_amount: Option<f64>,
    #[serde(default)]
    pub settlement_currency: Option<String>,
    #[serde(default)]
    pub settlement_fee: Option<f64>,
    #[serde(default)]
    pub settlement_status: Option<String>,
    #[serde(default)]
    pub settlement_response_code: Option<String>,
    #[serde(default)]
    pub settlement_response_description: Option<String>,
    #[serde(default)]
    pub payouttime: Option<String>,
}

/// Order object of the 2.0 settlement surface
///
/// Unlike the v1 [`Order`](crate::types::order::Order), amounts here mix
/// representations: the top-level `amount` stays a minor-unit string while
/// receiver shares are integers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettlementOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rectoken: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_callback_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub receiver: Vec<Receiver>,

    // Response-only fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<ResponseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse_status: Option<ReverseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reversal_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_data: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transaction: Vec<SettlementTransaction>,
}

/// The `{"order": {...}}` payload hidden inside the base64 `data` field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementOrderWrapper {
    pub order: SettlementOrder,
}

/// Inner object of an outbound 2.0 request
#[derive(Debug, Clone, Serialize)]
pub struct SettlementRequest {
    pub version: VersionTag,
    pub data: String,
    pub signature: String,
}

/// Outbound `{"request": {...}}` envelope of the 2.0 surface
#[derive(Debug, Clone, Serialize)]
pub struct SettlementRequestEnvelope {
    pub request: SettlementRequest,
}

impl SettlementRequestEnvelope {
    /// Encode an order into an unsigned 2.0 envelope
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Serialization`] when the order cannot be
    /// serialized.
    pub fn new(order: &SettlementOrder) -> Result<Self, GatewayError> {
        let payload = serde_json::to_vec(&SettlementOrderWrapper {
            order: order.clone(),
        })
        .map_err(|e| GatewayError::serialization(e.to_string()))?;

        Ok(SettlementRequestEnvelope {
            request: SettlementRequest {
                version: VersionTag(2.0),
                data: BASE64.encode(payload),
                signature: String::new(),
            },
        })
    }

    /// Sign the envelope over `key|data`
    pub fn sign(&mut self, key: &str) {
        self.request.signature = signature::digest_data(key, &self.request.data);
    }
}

/// Inner object of an inbound 2.0 response
#[derive(Debug, Clone, Deserialize)]
pub struct SettlementResponse {
    #[serde(default)]
    pub version: Option<String>,
    /// Base64-encoded `{"order": {...}}` payload
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub signature: Option<String>,
}

/// Inbound `{"response": {...}}` envelope of the 2.0 surface
#[derive(Debug, Clone, Deserialize)]
pub struct SettlementResponseEnvelope {
    pub response: SettlementResponse,
}

impl SettlementResponseEnvelope {
    /// Decode the base64 payload
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Serialization`] when the payload is not
    /// valid base64.
    pub fn data_bytes(&self) -> Result<Vec<u8>, GatewayError> {
        BASE64
            .decode(&self.response.data)
            .map_err(|e| GatewayError::serialization(format!("settlement data is not base64: {e}")))
    }

    /// Verify the response signature
    ///
    /// The gateway signs `key|<decoded payload>`, i.e. the digest covers
    /// the payload text, not its base64 form. A missing signature or an
    /// undecodable payload verifies as false.
    pub fn signature_valid(&self, key: &str) -> bool {
        let Some(attached) = self.response.signature.as_deref() else {
            return false;
        };
        let Ok(decoded) = self.data_bytes() else {
            return false;
        };
        let Ok(text) = std::str::from_utf8(&decoded) else {
            return false;
        };
        signature::digest_data(key, text) == attached
    }

    /// Decode and parse the order hidden inside the payload
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Serialization`] when the payload is not
    /// valid base64 or not a valid order wrapper.
    pub fn order(&self) -> Result<SettlementOrder, GatewayError> {
        let decoded = self.data_bytes()?;
        let wrapper: SettlementOrderWrapper = serde_json::from_slice(&decoded)
            .map_err(|e| GatewayError::serialization(e.to_string()).with_response(&decoded))?;
        Ok(wrapper.order)
    }
}

/// Inner object of a 2.0 top-level error reply
///
/// Some failures skip the data/signature triple entirely and come back as
/// a bare error object. A zero `error_code` means no error envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettlementErrorBody {
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub error_message: String,
}

/// Inbound 2.0 error envelope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettlementErrorEnvelope {
    #[serde(default)]
    pub response: SettlementErrorBody,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> SettlementOrder {
        SettlementOrder {
            order_id: Some("a1a8c147-a0f9-4f9e-a6be-b2882aeb0910".to_string()),
            merchant_id: Some(1396424),
            amount: Some("1000".to_string()),
            currency: Some("UAH".to_string()),
            order_type: Some("settlement".to_string()),
            receiver: vec![
                Receiver::merchant("sub-1", 600, "driver share"),
                Receiver::merchant("sub-2", 400, "fleet share"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn version_serializes_with_a_trailing_zero() {
        let envelope = SettlementRequestEnvelope::new(&sample_order()).unwrap();
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"version\":2.0"), "got {json}");
    }

    #[test]
    fn request_data_round_trips_through_base64() {
        let order = sample_order();
        let envelope = SettlementRequestEnvelope::new(&order).unwrap();
        let decoded = BASE64.decode(&envelope.request.data).unwrap();
        let wrapper: SettlementOrderWrapper = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(wrapper.order, order);
    }

    #[test]
    fn signing_covers_the_encoded_data() {
        let mut envelope = SettlementRequestEnvelope::new(&sample_order()).unwrap();
        envelope.sign("testkey");
        assert_eq!(
            envelope.request.signature,
            signature::digest_data("testkey", &envelope.request.data)
        );
    }

    #[test]
    fn response_signature_covers_the_decoded_payload() {
        let payload = r#"{"order":{"order_id":"o-1","response_status":"success"}}"#;
        let envelope = SettlementResponseEnvelope {
            response: SettlementResponse {
                version: Some("2.0".to_string()),
                data: BASE64.encode(payload),
                signature: Some(signature::digest_data("testkey", payload)),
            },
        };
        assert!(envelope.signature_valid("testkey"));
        assert!(!envelope.signature_valid("other-key"));
        assert_eq!(envelope.order().unwrap().order_id.as_deref(), Some("o-1"));
    }

    #[test]
    fn missing_signature_never_verifies() {
        let envelope = SettlementResponseEnvelope {
            response: SettlementResponse {
                version: None,
                data: BASE64.encode("{}"),
                signature: None,
            },
        };
        assert!(!envelope.signature_valid("testkey"));
    }

    #[test]
    fn undecodable_payload_is_a_serialization_error() {
        let envelope = SettlementResponseEnvelope {
            response: SettlementResponse {
                version: None,
                data: "not-base64!!!".to_string(),
                signature: None,
            },
        };
        assert!(matches!(
            envelope.order(),
            Err(GatewayError::Serialization { .. })
        ));
    }

    #[test]
    fn error_envelope_defaults_to_code_zero() {
        let none: SettlementErrorEnvelope =
            serde_json::from_str(r#"{"response":{"version":"2.0"}}"#).unwrap();
        assert_eq!(none.response.error_code, 0);

        let some: SettlementErrorEnvelope = serde_json::from_str(
            r#"{"response":{"error_code":1013,"error_message":"invalid signature"}}"#,
        )
        .unwrap();
        assert_eq!(some.response.error_code, 1013);
    }
}
