//! Order snapshots and lifecycle classification
//!
//! An [`Order`] is the gateway's view of one payment at a point in time.
//! The predicates in this module derive the lifecycle facts callers care
//! about (captured, reversed, declined, expired, still-held) from the
//! status fields. All predicates are total: an absent order status or an
//! absent sub-state field yields `false`, never a panic and never a false
//! positive.

use crate::core::signature::Signable;
use crate::types::response::ResponseCode;
use crate::types::status::{CaptureStatus, Currency, OrderStatus, ResponseStatus, ReverseStatus};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// How [`Order::captured_with`] treats responses without a capture sub-status
///
/// Two incompatible derivations of "captured" exist in historical gateway
/// responses: the nested capture sub-status, and an older shape that only
/// exposes `approved` + no reversal + a non-zero settlement fee. The
/// fallback is opt-in so the legacy inference can never silently produce a
/// false positive where the modern field exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaptureCompat {
    /// Trust only the nested capture sub-status (default)
    #[default]
    Strict,
    /// When the sub-status is entirely absent, fall back to the legacy
    /// fee-based inference
    LegacyFee,
}

/// Nested additional info carried inside status responses and callbacks
///
/// The gateway sometimes delivers this structure as a JSON object and
/// sometimes as a JSON-encoded string; both shapes decode into the same
/// type (see [`Order::additional_info`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_status: Option<CaptureStatus>,
    /// Captured amount in major units; delivered as a number, not a
    /// minor-unit string like the top-level amounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse_status: Option<ReverseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_fee: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_fee: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_response_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_response_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeend: Option<String>,
}

/// Accept additional info delivered either inline or as an encoded string
fn deserialize_additional_info<'de, D>(deserializer: D) -> Result<Option<AdditionalInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Inline(AdditionalInfo),
        Encoded(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Inline(info)) => Ok(Some(info)),
        Some(Raw::Encoded(text)) if text.is_empty() => Ok(None),
        Some(Raw::Encoded(text)) => serde_json::from_str(&text)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Gateway order snapshot (v1 wire shape)
///
/// All amount fields are decimal strings of minor currency units. Error and
/// response fields coexist with the order fields because the gateway folds
/// both into one object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_status: Option<CaptureStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reversal_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_date: Option<String>,
    /// Settlement-fee indicator; "0" or absent means nothing was settled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<ResponseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_code: Option<ResponseCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masked_card: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rrn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eci: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rectoken: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rectoken_lifetime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_cell_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_additional_info"
    )]
    pub additional_info: Option<AdditionalInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Echo of the string the gateway signed; derived, never signable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_signature_string: Option<String>,
}

/// True when an amount string is present and not literally zero
fn non_zero(amount: &Option<String>) -> bool {
    matches!(amount.as_deref(), Some(value) if !value.is_empty() && value != "0")
}

/// True when an amount string is absent, empty, or literally zero
fn absent_or_zero(amount: &Option<String>) -> bool {
    !non_zero(amount)
}

impl Order {
    /// Capture sub-status, wherever the response shape put it
    fn capture_sub_status(&self) -> Option<CaptureStatus> {
        self.additional_info
            .as_ref()
            .and_then(|info| info.capture_status)
            .or(self.capture_status)
    }

    /// Whether the hold behind this order has been captured
    ///
    /// Strict derivation: true iff the capture sub-status equals `captured`.
    /// An absent sub-status yields `false`; use [`Order::captured_with`] to
    /// opt into the legacy inference for old response shapes.
    pub fn captured(&self) -> bool {
        self.captured_with(CaptureCompat::Strict)
    }

    /// Capture check with an explicit compatibility mode
    ///
    /// Under [`CaptureCompat::LegacyFee`], responses that carry no capture
    /// sub-status at all fall back to the historical inference: approved,
    /// nothing reversed, and a non-zero settlement fee.
    pub fn captured_with(&self, compat: CaptureCompat) -> bool {
        match self.capture_sub_status() {
            Some(status) => status == CaptureStatus::Captured,
            None => match compat {
                CaptureCompat::Strict => false,
                CaptureCompat::LegacyFee => {
                    self.order_status == Some(OrderStatus::Approved)
                        && absent_or_zero(&self.reversal_amount)
                        && non_zero(&self.fee)
                }
            },
        }
    }

    /// Whether any part of this order has been reversed
    ///
    /// A non-empty, non-"0" reversal amount is sufficient on its own; the
    /// top-level status is not consulted because partial reversals leave it
    /// at `approved`.
    pub fn reversed(&self) -> bool {
        non_zero(&self.reversal_amount)
    }

    /// Whether this order is an approved hold that was neither reversed nor
    /// captured/settled
    pub fn uncompleted_hold(&self) -> bool {
        self.order_status == Some(OrderStatus::Approved)
            && absent_or_zero(&self.reversal_amount)
            && absent_or_zero(&self.fee)
    }

    /// Whether the order was declined
    pub fn declined(&self) -> bool {
        self.order_status == Some(OrderStatus::Declined)
    }

    /// Whether the order expired before completion
    pub fn expired(&self) -> bool {
        self.order_status == Some(OrderStatus::Expired)
    }

    /// Order amount in major units; 0.0 when absent or unparsable
    ///
    /// The amount accessors are best-effort display helpers, not
    /// authoritative money arithmetic.
    pub fn real_amount(&self) -> f64 {
        parse_minor(&self.amount)
    }

    /// Reversed amount in major units; 0.0 when absent or unparsable
    pub fn reversed_amount(&self) -> f64 {
        parse_minor(&self.reversal_amount)
    }

    /// Settled (split) amount in major units; 0.0 when absent or unparsable
    pub fn split_amount(&self) -> f64 {
        parse_minor(&self.settlement_amount)
    }

    /// Captured amount in major units, as delivered in additional info;
    /// 0.0 when absent
    pub fn captured_amount(&self) -> f64 {
        self.additional_info
            .as_ref()
            .and_then(|info| info.capture_amount)
            .unwrap_or(0.0)
    }
}

/// Parse a minor-unit decimal string into major units, defaulting to 0.0
fn parse_minor(amount: &Option<String>) -> f64 {
    amount
        .as_deref()
        .and_then(|value| value.parse::<f64>().ok())
        .map(|value| value / 100.0)
        .unwrap_or(0.0)
}

impl Signable for Order {
    fn signature_pairs(&self) -> Vec<(&'static str, String)> {
        fn push(pairs: &mut Vec<(&'static str, String)>, name: &'static str, value: &Option<String>) {
            if let Some(value) = value {
                pairs.push((name, value.clone()));
            }
        }

        let mut pairs = Vec::with_capacity(32);
        push(&mut pairs, "actual_amount", &self.actual_amount);
        push(&mut pairs, "amount", &self.amount);
        push(&mut pairs, "approval_code", &self.approval_code);
        push(&mut pairs, "eci", &self.eci);
        push(&mut pairs, "error_message", &self.error_message);
        push(&mut pairs, "fee", &self.fee);
        push(&mut pairs, "masked_card", &self.masked_card);
        push(&mut pairs, "merchant_data", &self.merchant_data);
        push(&mut pairs, "order_desc", &self.order_desc);
        push(&mut pairs, "order_time", &self.order_time);
        push(&mut pairs, "parent_order_id", &self.parent_order_id);
        push(&mut pairs, "payment_system", &self.payment_system);
        push(&mut pairs, "product_id", &self.product_id);
        push(&mut pairs, "rectoken", &self.rectoken);
        push(&mut pairs, "rectoken_lifetime", &self.rectoken_lifetime);
        push(&mut pairs, "response_description", &self.response_description);
        push(&mut pairs, "reversal_amount", &self.reversal_amount);
        push(&mut pairs, "rrn", &self.rrn);
        push(&mut pairs, "sender_account", &self.sender_account);
        push(&mut pairs, "sender_cell_phone", &self.sender_cell_phone);
        push(&mut pairs, "sender_email", &self.sender_email);
        push(&mut pairs, "settlement_amount", &self.settlement_amount);
        push(&mut pairs, "settlement_date", &self.settlement_date);
        push(&mut pairs, "verification_status", &self.verification_status);

        if let Some(id) = &self.order_id {
            pairs.push(("order_id", id.to_string()));
        }
        if let Some(status) = &self.order_status {
            pairs.push(("order_status", status.as_str().to_string()));
        }
        if let Some(status) = &self.capture_status {
            pairs.push(("capture_status", status.as_str().to_string()));
        }
        if let Some(status) = &self.response_status {
            pairs.push(("response_status", status.as_str().to_string()));
        }
        if let Some(currency) = &self.currency {
            pairs.push(("currency", currency.as_str().to_string()));
        }
        if let Some(currency) = &self.actual_currency {
            pairs.push(("actual_currency", currency.as_str().to_string()));
        }
        if let Some(currency) = &self.settlement_currency {
            pairs.push(("settlement_currency", currency.as_str().to_string()));
        }
        if let Some(id) = &self.merchant_id {
            pairs.push(("merchant_id", id.to_string()));
        }
        if let Some(id) = &self.payment_id {
            pairs.push(("payment_id", id.to_string()));
        }

        pairs
    }

    fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    fn set_signature(&mut self, digest: String) {
        self.signature = Some(digest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::signature;
    use rstest::rstest;

    fn approved_order() -> Order {
        Order {
            order_status: Some(OrderStatus::Approved),
            ..Default::default()
        }
    }

    #[test]
    fn captured_follows_the_nested_sub_status() {
        let mut order = approved_order();
        order.additional_info = Some(AdditionalInfo {
            capture_status: Some(CaptureStatus::Captured),
            capture_amount: Some(100.0),
            ..Default::default()
        });
        assert!(order.captured());
        assert_eq!(order.captured_amount(), 100.0);
    }

    #[test]
    fn captured_is_false_when_sub_status_absent() {
        let mut order = approved_order();
        order.fee = Some("250".to_string());
        // Strict mode never infers capture from the fee
        assert!(!order.captured());
    }

    #[test]
    fn legacy_fee_fallback_requires_the_explicit_flag() {
        let mut order = approved_order();
        order.fee = Some("250".to_string());
        assert!(order.captured_with(CaptureCompat::LegacyFee));

        // The fallback never overrides a present sub-status
        order.capture_status = Some(CaptureStatus::Hold);
        assert!(!order.captured_with(CaptureCompat::LegacyFee));
    }

    #[test]
    fn legacy_fee_fallback_rejects_reversed_orders() {
        let mut order = approved_order();
        order.fee = Some("250".to_string());
        order.reversal_amount = Some("100".to_string());
        assert!(!order.captured_with(CaptureCompat::LegacyFee));
    }

    #[test]
    fn nonzero_reversal_amount_alone_means_reversed() {
        let mut order = approved_order();
        order.reversal_amount = Some("50".to_string());
        assert!(order.reversed());
    }

    #[rstest]
    #[case::absent(None)]
    #[case::empty(Some(""))]
    #[case::zero(Some("0"))]
    fn reversed_is_false_without_a_real_amount(#[case] reversal: Option<&str>) {
        let mut order = Order {
            order_status: Some(OrderStatus::Reversed),
            ..Default::default()
        };
        order.reversal_amount = reversal.map(str::to_string);
        assert!(!order.reversed());
    }

    #[rstest]
    #[case::plain_hold(None, None, true)]
    #[case::zero_markers(Some("0"), Some("0"), true)]
    #[case::reversed(Some("100"), None, false)]
    #[case::settled(None, Some("250"), false)]
    fn uncompleted_hold_requires_no_reversal_and_no_fee(
        #[case] reversal: Option<&str>,
        #[case] fee: Option<&str>,
        #[case] expected: bool,
    ) {
        let mut order = approved_order();
        order.reversal_amount = reversal.map(str::to_string);
        order.fee = fee.map(str::to_string);
        assert_eq!(order.uncompleted_hold(), expected);
    }

    #[test]
    fn predicates_are_false_on_an_empty_snapshot() {
        let order = Order::default();
        assert!(!order.captured());
        assert!(!order.reversed());
        assert!(!order.uncompleted_hold());
        assert!(!order.declined());
        assert!(!order.expired());
    }

    #[rstest]
    #[case::valid(Some("1050"), 10.50)]
    #[case::absent(None, 0.0)]
    #[case::garbage(Some("not-a-number"), 0.0)]
    fn amount_accessors_are_best_effort(#[case] wire: Option<&str>, #[case] expected: f64) {
        let order = Order {
            amount: wire.map(str::to_string),
            ..Default::default()
        };
        assert_eq!(order.real_amount(), expected);
    }

    #[test]
    fn additional_info_decodes_from_object_or_string() {
        let inline: Order = serde_json::from_str(
            r#"{"additional_info":{"capture_status":"captured","capture_amount":12.5}}"#,
        )
        .unwrap();
        assert!(inline.captured());

        let encoded: Order = serde_json::from_str(
            r#"{"additional_info":"{\"capture_status\":\"hold\"}"}"#,
        )
        .unwrap();
        assert_eq!(
            encoded.additional_info.unwrap().capture_status,
            Some(CaptureStatus::Hold)
        );

        let empty: Order = serde_json::from_str(r#"{"additional_info":""}"#).unwrap();
        assert!(empty.additional_info.is_none());
    }

    #[test]
    fn order_signature_verifies_against_reference_digest() {
        // testkey|100|UAH|a1a8c147-a0f9-4f9e-a6be-b2882aeb0910|approved
        let order = Order {
            order_id: Some("a1a8c147-a0f9-4f9e-a6be-b2882aeb0910".parse().unwrap()),
            amount: Some("100".to_string()),
            currency: Some(Currency::UAH),
            order_status: Some(OrderStatus::Approved),
            signature: Some("82d0ab2e9c9ef6d84d897905287cb1fe1b34507f".to_string()),
            ..Default::default()
        };
        assert!(signature::verify(&order, "testkey"));
        assert!(!signature::verify(&order, "wrong-key"));
    }
}
