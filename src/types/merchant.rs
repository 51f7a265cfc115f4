//! Merchant account configuration
//!
//! A [`MerchantAccount`] carries everything needed to act on behalf of one
//! merchant: its gateway identifier, the two independent signing keys, and
//! the split-settlement receiver set. The payment key and the credit key
//! sign distinct operation classes and are never interchangeable.

use crate::types::error::GatewayError;
use serde::{Deserialize, Serialize};

/// A receiver of a split settlement
///
/// Each split account names a receiving merchant and the percentage of the
/// captured amount routed to it. Percentages across a set must sum to
/// exactly 100.0 (see [`MerchantAccount::validate_split_accounts`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitAccount {
    /// Gateway identifier of the receiving merchant
    pub merchant_id: String,

    /// Share of the captured amount routed to this receiver, in percent
    pub percentage: f64,

    /// Settlement description attached to the receiver's requisites
    #[serde(default)]
    pub description: String,
}

impl SplitAccount {
    /// Create a split account with an empty description
    pub fn new(merchant_id: impl Into<String>, percentage: f64) -> Self {
        SplitAccount {
            merchant_id: merchant_id.into(),
            percentage,
            description: String::new(),
        }
    }
}

/// A merchant account registered with the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantAccount {
    /// Gateway merchant identifier (numeric, transmitted as a string)
    pub merchant_id: String,

    /// Secret key for payment-class operations (verify, hold, capture,
    /// refund, status, split)
    pub merchant_key: String,

    /// Secret key for credit-class operations (withdrawals); never used for
    /// payment-class requests
    pub credit_key: String,

    /// Order description sent with payment requests
    #[serde(default)]
    pub merchant_string: String,

    /// Human-readable description folded into merchant-data metadata
    #[serde(default)]
    pub description: String,

    /// Checkout page design identifier used for verification links
    #[serde(default)]
    pub design_id: String,

    /// Only technical (aggregator) accounts may initiate split settlement
    #[serde(default)]
    pub is_technical: bool,

    /// Ordered set of split-settlement receivers
    #[serde(default)]
    pub split_accounts: Vec<SplitAccount>,
}

impl MerchantAccount {
    /// Create a minimal account from its identifier and keys
    pub fn new(
        merchant_id: impl Into<String>,
        merchant_key: impl Into<String>,
        credit_key: impl Into<String>,
    ) -> Self {
        MerchantAccount {
            merchant_id: merchant_id.into(),
            merchant_key: merchant_key.into(),
            credit_key: credit_key.into(),
            merchant_string: String::new(),
            description: String::new(),
            design_id: String::new(),
            is_technical: false,
            split_accounts: Vec::new(),
        }
    }

    /// Merchant identifier parsed as an integer, as the settlement (v2) wire
    /// format requires; `0` when the identifier is not numeric
    pub fn merchant_id_int(&self) -> i64 {
        self.merchant_id.parse().unwrap_or(0)
    }

    /// Check the split-settlement preconditions on this account
    ///
    /// Validates, before any network call, that:
    /// - the account is technical (only aggregators may split),
    /// - at least one split account is configured,
    /// - the split percentages sum to exactly 100.0.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] naming the violated
    /// precondition.
    pub fn validate_split_accounts(&self) -> Result<(), GatewayError> {
        if !self.is_technical {
            return Err(GatewayError::configuration(
                "only technical accounts can initiate split settlement",
            ));
        }

        if self.split_accounts.is_empty() {
            return Err(GatewayError::configuration("no split accounts configured"));
        }

        let sum: f64 = self.split_accounts.iter().map(|a| a.percentage).sum();
        if sum != 100.0 {
            return Err(GatewayError::configuration(format!(
                "split percentages sum to {sum}, expected 100"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn technical_account(percentages: &[f64]) -> MerchantAccount {
        let mut account = MerchantAccount::new("1396424", "pay-key", "credit-key");
        account.is_technical = true;
        account.split_accounts = percentages
            .iter()
            .enumerate()
            .map(|(i, p)| SplitAccount::new(format!("sub-{i}"), *p))
            .collect();
        account
    }

    #[rstest]
    #[case::even(&[30.0, 30.0, 40.0])]
    #[case::uneven(&[33.0, 33.0, 34.0])]
    #[case::single(&[100.0])]
    fn valid_split_sets_pass(#[case] percentages: &[f64]) {
        assert!(technical_account(percentages).validate_split_accounts().is_ok());
    }

    #[rstest]
    #[case::short(&[33.0, 33.0, 33.0])]
    #[case::over(&[60.0, 50.0])]
    fn split_sets_not_summing_to_100_are_rejected(#[case] percentages: &[f64]) {
        let err = technical_account(percentages)
            .validate_split_accounts()
            .unwrap_err();
        assert!(matches!(err, GatewayError::Configuration { .. }));
    }

    #[test]
    fn non_technical_accounts_cannot_split() {
        let mut account = technical_account(&[100.0]);
        account.is_technical = false;
        let err = account.validate_split_accounts().unwrap_err();
        assert!(err.to_string().contains("technical"));
    }

    #[test]
    fn empty_split_set_is_rejected() {
        let account = technical_account(&[]);
        let err = account.validate_split_accounts().unwrap_err();
        assert!(err.to_string().contains("no split accounts"));
    }

    #[test]
    fn merchant_id_int_falls_back_to_zero() {
        assert_eq!(technical_account(&[100.0]).merchant_id_int(), 1396424);
        let account = MerchantAccount::new("not-numeric", "k", "c");
        assert_eq!(account.merchant_id_int(), 0);
    }
}
