//! Gateway reply classification
//!
//! The gateway reports failures in several places at once: an envelope-level
//! response status, a numeric error code, and a business response code that
//! can ride along inside an otherwise successful envelope. Classification
//! normalizes all of that into either an [`Order`] the caller can use or a
//! single [`GatewayError`] with the right fatality.

use crate::types::error::GatewayError;
use crate::types::order::Order;
use crate::types::response::{CheckoutResponse, ResponseCode};
use crate::types::settlement::{SettlementErrorEnvelope, SettlementOrder, SettlementResponseEnvelope};
use crate::types::status::ResponseStatus;

/// Classify a v1 order reply
///
/// Rules, in order:
/// 1. `response_status != success` is a fatal rejection, reported under the
///    numeric `error_code`, falling back to the business `response_code`
///    (or `-1` when the gateway omitted both);
/// 2. a non-empty `response_code` beside a description is a soft business
///    failure riding along in a successful envelope;
/// 3. everything else is a usable order.
///
/// # Errors
///
/// Returns [`GatewayError::Gateway`] for both rejection shapes.
pub fn classify_order(order: Order) -> Result<Order, GatewayError> {
    if order.response_status != Some(ResponseStatus::Success) {
        let code = fatal_code(order.error_code, order.response_code.as_ref());
        let message = order
            .error_message
            .clone()
            .or_else(|| order.response_description.clone())
            .unwrap_or_else(|| "gateway reported failure".to_string());
        return Err(GatewayError::Gateway {
            code,
            message,
            fatal: true,
            request: None,
            response: None,
        });
    }

    if let Some(code) = &order.response_code {
        if !code.is_empty() {
            if let Some(description) = &order.response_description {
                return Err(GatewayError::soft_gateway(
                    code.canonical(),
                    description.clone(),
                ));
            }
        }
    }

    Ok(order)
}

/// Classify a checkout URL reply, extracting the hosted payment URL
///
/// # Errors
///
/// Returns [`GatewayError::Gateway`] when the envelope is not successful or
/// the URL is missing from a successful one.
pub fn classify_checkout(response: CheckoutResponse) -> Result<String, GatewayError> {
    if response.response_status != Some(ResponseStatus::Success) {
        let code = fatal_code(response.error_code, response.response_code.as_ref());
        let message = response
            .error_message
            .or(response.response_description)
            .unwrap_or_else(|| "gateway reported failure".to_string());
        return Err(GatewayError::Gateway {
            code,
            message,
            fatal: true,
            request: None,
            response: None,
        });
    }

    if let Some(code) = &response.response_code {
        if !code.is_empty() {
            if let Some(description) = &response.response_description {
                return Err(GatewayError::soft_gateway(
                    code.canonical(),
                    description.clone(),
                ));
            }
        }
    }

    response
        .checkout_url
        .ok_or_else(|| GatewayError::fatal_gateway(-1, "successful reply carries no checkout url"))
}

/// Classify a raw 2.0 settlement reply
///
/// Rules, in order:
/// 1. a top-level error envelope with a non-zero `error_code` is fatal;
/// 2. the payload must decode into an order wrapper;
/// 3. the decoded order's `response_status` must be `success` or `created`
///    (fresh settlements report as `created`), otherwise the reply is fatal
///    under its business response code.
///
/// # Errors
///
/// Returns [`GatewayError::Gateway`] or [`GatewayError::Serialization`]
/// accordingly.
pub fn classify_settlement(raw: &[u8]) -> Result<SettlementOrder, GatewayError> {
    if let Ok(error_envelope) = serde_json::from_slice::<SettlementErrorEnvelope>(raw) {
        if error_envelope.response.error_code != 0 {
            return Err(GatewayError::fatal_gateway(
                error_envelope.response.error_code,
                error_envelope.response.error_message,
            )
            .with_response(raw));
        }
    }

    let envelope: SettlementResponseEnvelope = serde_json::from_slice(raw)
        .map_err(|e| GatewayError::serialization(e.to_string()).with_response(raw))?;
    let order = envelope.order()?;

    match order.response_status {
        Some(ResponseStatus::Success) | Some(ResponseStatus::Created) => Ok(order),
        other => {
            let code = order
                .response_code
                .clone()
                .unwrap_or_else(|| "-1".to_string());
            let status = other
                .map(|s| s.to_string())
                .unwrap_or_else(|| "absent".to_string());
            let message = order
                .response_description
                .clone()
                .unwrap_or_else(|| format!("settlement status is {status}"));
            Err(GatewayError::Gateway {
                code,
                message,
                fatal: true,
                request: None,
                response: None,
            }
            .with_response(raw))
        }
    }
}

/// Normalized code of a fatal envelope rejection
///
/// The numeric `error_code` wins when present; otherwise the business
/// `response_code` is canonicalized, and `-1` stands in when the gateway
/// reported neither.
fn fatal_code(error_code: Option<i64>, response_code: Option<&ResponseCode>) -> String {
    match (error_code, response_code) {
        (Some(code), _) => code.to_string(),
        (None, Some(code)) if !code.is_empty() => code.canonical(),
        _ => "-1".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::signature;
    use crate::types::status::OrderStatus;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    fn successful_order() -> Order {
        Order {
            response_status: Some(ResponseStatus::Success),
            order_status: Some(OrderStatus::Approved),
            ..Default::default()
        }
    }

    #[test]
    fn successful_order_passes_through() {
        assert!(classify_order(successful_order()).is_ok());
    }

    #[test]
    fn failed_envelope_is_fatal_under_its_error_code() {
        let order = Order {
            response_status: Some(ResponseStatus::Failure),
            error_code: Some(1013),
            error_message: Some("invalid signature".to_string()),
            ..Default::default()
        };
        let err = classify_order(order).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, GatewayError::Gateway { ref code, .. } if code == "1013"));
    }

    #[test]
    fn failed_envelope_without_error_code_reports_the_response_code() {
        let order = Order {
            response_status: Some(ResponseStatus::Failure),
            response_code: Some(ResponseCode::Text("1013".to_string())),
            response_description: Some("invalid signature".to_string()),
            ..Default::default()
        };
        let err = classify_order(order).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(
            err,
            GatewayError::Gateway { ref code, ref message, .. }
                if code == "1013" && message == "invalid signature"
        ));
    }

    #[test]
    fn missing_error_code_defaults_to_minus_one() {
        let order = Order {
            response_status: None,
            ..Default::default()
        };
        let err = classify_order(order).unwrap_err();
        assert!(matches!(err, GatewayError::Gateway { ref code, .. } if code == "-1"));
    }

    #[test]
    fn riding_response_code_is_a_soft_failure() {
        let mut order = successful_order();
        order.response_code = Some(ResponseCode::Int(1013));
        order.response_description = Some("card declined".to_string());
        let err = classify_order(order).unwrap_err();
        assert!(!err.is_fatal());
        assert!(matches!(err, GatewayError::Gateway { ref code, fatal: false, .. } if code == "1013"));
    }

    #[test]
    fn empty_response_code_is_not_a_failure() {
        let mut order = successful_order();
        order.response_code = Some(ResponseCode::Text(String::new()));
        order.response_description = Some("Ok".to_string());
        assert!(classify_order(order).is_ok());
    }

    #[test]
    fn checkout_extracts_the_url() {
        let response = CheckoutResponse {
            response_status: Some(ResponseStatus::Success),
            checkout_url: Some("https://pay.example/u/1".to_string()),
            ..Default::default()
        };
        assert_eq!(classify_checkout(response).unwrap(), "https://pay.example/u/1");
    }

    #[test]
    fn checkout_without_url_is_fatal() {
        let response = CheckoutResponse {
            response_status: Some(ResponseStatus::Success),
            ..Default::default()
        };
        assert!(classify_checkout(response).unwrap_err().is_fatal());
    }

    #[test]
    fn checkout_response_code_without_description_is_not_a_failure() {
        let response = CheckoutResponse {
            response_status: Some(ResponseStatus::Success),
            response_code: Some(ResponseCode::Int(1013)),
            checkout_url: Some("https://pay.example/u/2".to_string()),
            ..Default::default()
        };
        assert_eq!(classify_checkout(response).unwrap(), "https://pay.example/u/2");
    }

    #[test]
    fn checkout_riding_response_code_is_a_soft_failure() {
        let response = CheckoutResponse {
            response_status: Some(ResponseStatus::Success),
            response_code: Some(ResponseCode::Int(1013)),
            response_description: Some("card declined".to_string()),
            checkout_url: Some("https://pay.example/u/3".to_string()),
            ..Default::default()
        };
        let err = classify_checkout(response).unwrap_err();
        assert!(matches!(err, GatewayError::Gateway { fatal: false, .. }));
    }

    #[test]
    fn checkout_failure_without_error_code_reports_the_response_code() {
        let response = CheckoutResponse {
            response_status: Some(ResponseStatus::Failure),
            response_code: Some(ResponseCode::Text("1013".to_string())),
            response_description: Some("invalid signature".to_string()),
            ..Default::default()
        };
        let err = classify_checkout(response).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, GatewayError::Gateway { ref code, .. } if code == "1013"));
    }

    fn settlement_reply(order: &SettlementOrder, key: &str) -> Vec<u8> {
        let payload = serde_json::to_string(&serde_json::json!({ "order": order })).unwrap();
        let data = BASE64.encode(&payload);
        let sig = signature::digest_data(key, &payload);
        serde_json::to_vec(&serde_json::json!({
            "response": {"version": "2.0", "data": data, "signature": sig}
        }))
        .unwrap()
    }

    #[test]
    fn settlement_success_and_created_both_pass() {
        for status in [ResponseStatus::Success, ResponseStatus::Created] {
            let order = SettlementOrder {
                order_id: Some("o-1".to_string()),
                response_status: Some(status),
                ..Default::default()
            };
            let classified = classify_settlement(&settlement_reply(&order, "k")).unwrap();
            assert_eq!(classified.order_id.as_deref(), Some("o-1"));
        }
    }

    #[test]
    fn settlement_error_envelope_is_fatal() {
        let raw = br#"{"response":{"error_code":1013,"error_message":"invalid signature"}}"#;
        let err = classify_settlement(raw).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, GatewayError::Gateway { ref code, .. } if code == "1013"));
    }

    #[test]
    fn settlement_failure_status_is_fatal_under_its_code() {
        let order = SettlementOrder {
            response_status: Some(ResponseStatus::Failure),
            response_code: Some("2000".to_string()),
            response_description: Some("receiver rejected".to_string()),
            ..Default::default()
        };
        let err = classify_settlement(&settlement_reply(&order, "k")).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, GatewayError::Gateway { ref code, .. } if code == "2000"));
    }

    #[test]
    fn settlement_garbage_is_a_serialization_error() {
        let err = classify_settlement(b"not json").unwrap_err();
        assert!(matches!(err, GatewayError::Serialization { .. }));
    }
}
