//! Outbound request objects
//!
//! [`InvoiceRequest`] is the caller-facing description of one operation;
//! [`PaymentRequest`] is the flat v1 wire object the client builds from it,
//! signs, and posts inside a `{"request": {...}}` envelope.

use crate::core::signature::Signable;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

/// Caller-facing parameters of a payment lifecycle operation
///
/// The invoice id doubles as the gateway order id. Amounts are given in
/// major currency units and converted to the wire's minor-unit decimal
/// string by [`InvoiceRequest::amount_string`].
#[derive(Debug, Clone, Default)]
pub struct InvoiceRequest {
    /// Order identifier in the issuing system
    pub invoice_id: Uuid,

    /// Amount in major currency units (e.g. 10.50 for 1050 minor units)
    pub amount: f64,

    /// Stored-card token used for payments and holds
    pub payment_card_token: Option<String>,

    /// Stored-card token receiving a withdrawal
    pub withdrawal_card_token: Option<String>,

    /// Raw card number receiving a withdrawal, when no token exists
    pub withdrawal_card_number: Option<String>,

    /// Callback URL the gateway notifies about order state changes
    pub server_callback_url: Option<String>,

    /// How long the gateway keeps the payment attempt alive
    pub payment_lifetime: Option<Duration>,

    /// Free-form key/value data folded into merchant-data metadata;
    /// never part of the signature
    pub extra_data: BTreeMap<String, String>,
}

impl InvoiceRequest {
    /// Create a request for the given invoice and amount
    pub fn new(invoice_id: Uuid, amount: f64) -> Self {
        InvoiceRequest {
            invoice_id,
            amount,
            ..Default::default()
        }
    }

    /// Order id as the gateway expects it; `None` for the nil UUID
    pub fn invoice_id_string(&self) -> Option<String> {
        if self.invoice_id.is_nil() {
            None
        } else {
            Some(self.invoice_id.to_string())
        }
    }

    /// Amount in minor currency units
    pub fn amount_minor(&self) -> i64 {
        (self.amount * 100.0) as i64
    }

    /// Amount as the wire's minor-unit decimal string
    pub fn amount_string(&self) -> String {
        self.amount_minor().to_string()
    }

    /// Render the extra data as a `/key:value/` suffix for merchant-data
    ///
    /// Keys are iterated in sorted order so the rendered metadata is
    /// deterministic.
    pub fn extra_data_string(&self) -> String {
        if self.extra_data.is_empty() {
            return String::new();
        }

        let mut rendered = String::from("/");
        for (key, value) in &self.extra_data {
            rendered.push_str(key);
            rendered.push(':');
            rendered.push_str(value);
            rendered.push('/');
        }
        rendered
    }
}

/// Flat v1 wire request object
///
/// Every field is an optional string, matching the gateway's loose wire
/// typing. `order_id`, `merchant_id`, and `signature` are always
/// serialized (null when absent); the rest are omitted when empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PaymentRequest {
    pub order_id: Option<String>,
    pub merchant_id: Option<String>,
    pub signature: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preauth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rectoken: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_rectoken: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_rectoken: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_card_number: Option<String>,

    /// Free-form extension map; excluded from both the wire object and the
    /// signature, folded into `merchant_data` instead
    #[serde(skip)]
    pub additional_data: BTreeMap<String, String>,
}

/// Push a populated optional field onto the signable pair list
fn push_pair(pairs: &mut Vec<(&'static str, String)>, name: &'static str, value: &Option<String>) {
    if let Some(value) = value {
        pairs.push((name, value.clone()));
    }
}

impl Signable for PaymentRequest {
    fn signature_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(18);
        push_pair(&mut pairs, "amount", &self.amount);
        push_pair(&mut pairs, "currency", &self.currency);
        push_pair(&mut pairs, "design_id", &self.design_id);
        push_pair(&mut pairs, "lang", &self.lang);
        push_pair(&mut pairs, "lifetime", &self.lifetime);
        push_pair(&mut pairs, "merchant_data", &self.merchant_data);
        push_pair(&mut pairs, "merchant_id", &self.merchant_id);
        push_pair(&mut pairs, "order_desc", &self.order_desc);
        push_pair(&mut pairs, "order_id", &self.order_id);
        push_pair(&mut pairs, "preauth", &self.preauth);
        push_pair(&mut pairs, "product_id", &self.product_id);
        push_pair(&mut pairs, "receiver_card_number", &self.receiver_card_number);
        push_pair(&mut pairs, "receiver_rectoken", &self.receiver_rectoken);
        push_pair(&mut pairs, "rectoken", &self.rectoken);
        push_pair(&mut pairs, "required_rectoken", &self.required_rectoken);
        push_pair(&mut pairs, "sender_email", &self.sender_email);
        push_pair(&mut pairs, "server_callback_url", &self.server_callback_url);
        push_pair(&mut pairs, "verification", &self.verification);
        pairs
    }

    fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    fn set_signature(&mut self, digest: String) {
        self.signature = Some(digest);
    }
}

/// Outbound `{"request": {...}}` envelope
#[derive(Debug, Serialize)]
pub struct RequestEnvelope<'a, T: Serialize> {
    pub request: &'a T,
}

impl<'a, T: Serialize> RequestEnvelope<'a, T> {
    pub fn new(request: &'a T) -> Self {
        RequestEnvelope { request }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::signature;

    #[test]
    fn signing_pins_the_reference_digest() {
        // testkey|1000|UAH|1396424|order-1|Y
        let mut request = PaymentRequest {
            order_id: Some("order-1".to_string()),
            merchant_id: Some("1396424".to_string()),
            amount: Some("1000".to_string()),
            currency: Some("UAH".to_string()),
            preauth: Some("Y".to_string()),
            ..Default::default()
        };
        signature::sign(&mut request, "testkey");
        assert_eq!(
            request.signature.as_deref(),
            Some("d6f2c114f9039e3a82960255f230baf60213c0a5")
        );
    }

    #[test]
    fn signature_ignores_population_order() {
        let mut ordered = PaymentRequest {
            amount: Some("500".to_string()),
            currency: Some("UAH".to_string()),
            order_id: Some("o".to_string()),
            ..Default::default()
        };

        // Populate the same fields in a different textual order
        let mut scrambled = PaymentRequest::default();
        scrambled.order_id = Some("o".to_string());
        scrambled.currency = Some("UAH".to_string());
        scrambled.amount = Some("500".to_string());

        signature::sign(&mut ordered, "k");
        signature::sign(&mut scrambled, "k");
        assert_eq!(ordered.signature, scrambled.signature);
    }

    #[test]
    fn additional_data_never_reaches_the_signature() {
        let mut plain = PaymentRequest {
            order_id: Some("o".to_string()),
            ..Default::default()
        };
        let mut extended = plain.clone();
        extended
            .additional_data
            .insert("driver".to_string(), "42".to_string());

        signature::sign(&mut plain, "k");
        signature::sign(&mut extended, "k");
        assert_eq!(plain.signature, extended.signature);
    }

    #[test]
    fn envelope_serializes_mandatory_fields_as_null() {
        let request = PaymentRequest {
            order_id: Some("o".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(RequestEnvelope::new(&request)).unwrap();
        assert_eq!(json["request"]["order_id"], "o");
        assert!(json["request"]["merchant_id"].is_null());
        assert!(json["request"].get("amount").is_none());
    }

    #[test]
    fn invoice_amount_converts_to_minor_units() {
        let invoice = InvoiceRequest::new(Uuid::new_v4(), 10.50);
        assert_eq!(invoice.amount_minor(), 1050);
        assert_eq!(invoice.amount_string(), "1050");
    }

    #[test]
    fn nil_invoice_id_renders_as_none() {
        let invoice = InvoiceRequest::new(Uuid::nil(), 1.0);
        assert_eq!(invoice.invoice_id_string(), None);
    }

    #[test]
    fn extra_data_renders_sorted_key_value_suffix() {
        let mut invoice = InvoiceRequest::new(Uuid::new_v4(), 1.0);
        invoice
            .extra_data
            .insert("trip".to_string(), "9".to_string());
        invoice
            .extra_data
            .insert("driver".to_string(), "42".to_string());
        assert_eq!(invoice.extra_data_string(), "/driver:42/trip:9/");
    }
}
