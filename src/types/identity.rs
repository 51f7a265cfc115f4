//! Client identification and limit lookup
//!
//! Some payment flows are only permitted for identified clients, and
//! identified clients carry spending limits. The lookup takes exactly one
//! identity document and comes back with the identification flag plus the
//! current limit window.

use crate::core::signature::Signable;
use serde::{Deserialize, Serialize};

/// One identity document a client can be looked up by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityDocument {
    /// Taxpayer identification number
    Tin(String),
    /// Internal passport series and number
    Passport(String),
    /// Plastic id-card number
    IdCard(String),
}

/// Wire request of the client status lookup
///
/// Exactly one of the three document fields is populated, depending on the
/// [`IdentityDocument`] the request was built from.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClientStatusRequest {
    pub merchant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_passport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_card: Option<String>,
    pub signature: Option<String>,
}

impl ClientStatusRequest {
    /// Build an unsigned lookup request for one document
    pub fn new(merchant_id: impl Into<String>, document: &IdentityDocument) -> Self {
        let mut request = ClientStatusRequest {
            merchant_id: Some(merchant_id.into()),
            ..Default::default()
        };
        match document {
            IdentityDocument::Tin(tin) => request.ipn = Some(tin.clone()),
            IdentityDocument::Passport(passport) => {
                request.internal_passport = Some(passport.clone())
            }
            IdentityDocument::IdCard(card) => request.id_card = Some(card.clone()),
        }
        request
    }
}

impl Signable for ClientStatusRequest {
    fn signature_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(card) = &self.id_card {
            pairs.push(("id_card", card.clone()));
        }
        if let Some(passport) = &self.internal_passport {
            pairs.push(("internal_passport", passport.clone()));
        }
        if let Some(tin) = &self.ipn {
            pairs.push(("ipn", tin.clone()));
        }
        if let Some(id) = &self.merchant_id {
            pairs.push(("merchant_id", id.clone()));
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

/// Current limit window of an identified client
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Balance {
    pub current_limit: f64,
    pub used_limit: f64,
    #[serde(default)]
    pub current_date: String,
}

impl Balance {
    /// Limit still available in the current window
    pub fn remaining(&self) -> f64 {
        self.current_limit - self.used_limit
    }
}

/// Reply of the client status lookup
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientStatusResponse {
    #[serde(default)]
    pub is_identified: bool,
    #[serde(default)]
    pub ipn: Option<String>,
    #[serde(default)]
    pub balance: Option<Balance>,
    /// Business-level error text; its presence means the lookup failed
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::signature;
    use rstest::rstest;

    #[rstest]
    #[case::tin(
        IdentityDocument::Tin("1234567890".to_string()),
        // idkey|1234567890|1396424
        "cc3a3c7a9c351e0f7a9e7654bc498e6cd6b68863"
    )]
    #[case::passport(
        IdentityDocument::Passport("AA123456".to_string()),
        // idkey|AA123456|1396424
        "a6c4f6e94fbeb6f91ed04a10ff8dba566143162e"
    )]
    fn lookup_request_signs_document_before_merchant(
        #[case] document: IdentityDocument,
        #[case] expected: &str,
    ) {
        let mut request = ClientStatusRequest::new("1396424", &document);
        signature::sign(&mut request, "idkey");
        assert_eq!(request.signature.as_deref(), Some(expected));
    }

    #[test]
    fn exactly_one_document_field_is_populated() {
        let request =
            ClientStatusRequest::new("1396424", &IdentityDocument::IdCard("000123".to_string()));
        assert!(request.ipn.is_none());
        assert!(request.internal_passport.is_none());
        assert_eq!(request.id_card.as_deref(), Some("000123"));

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("ipn").is_none());
        assert_eq!(json["id_card"], "000123");
    }

    #[test]
    fn balance_reports_the_remaining_limit() {
        let response: ClientStatusResponse = serde_json::from_str(
            r#"{"is_identified":true,"ipn":"1234567890","balance":{"current_limit":50000.0,"used_limit":12000.0,"current_date":"2024-05-01"}}"#,
        )
        .unwrap();
        assert!(response.is_identified);
        let balance = response.balance.unwrap();
        assert_eq!(balance.remaining(), 38000.0);
    }

    #[test]
    fn error_field_marks_a_failed_lookup() {
        let response: ClientStatusResponse =
            serde_json::from_str(r#"{"error":"client not found"}"#).unwrap();
        assert_eq!(response.error.as_deref(), Some("client not found"));
        assert!(!response.is_identified);
    }
}
