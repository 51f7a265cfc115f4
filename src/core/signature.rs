//! Canonical message signing and verification
//!
//! Every outbound request and inbound callback shares one signing scheme the
//! gateway recomputes independently, so the algorithm here must stay
//! bit-exact:
//!
//! 1. enumerate the signable fields of the message — scalar textual fields
//!    with a present value; the signature field itself, derived fields, and
//!    free-form extension maps are excluded;
//! 2. sort them by the declared field identifier, ASCII lexicographic —
//!    never by wire name, declaration order, or map iteration;
//! 3. join the secret key and the sorted *values* with `|`, dropping fields
//!    whose value is an empty string;
//! 4. SHA-1 the joined string and render lowercase hex.
//!
//! Each message type declares its signable fields as an explicit static list
//! of (identifier, value) pairs via [`Signable`]; there is no runtime
//! reflection, so the ordering contract cannot be broken by struct layout.
//!
//! SHA-1 is a compatibility requirement of the remote gateway, not a choice
//! this crate gets to make.

use crate::types::error::GatewayError;
use sha1::{Digest, Sha1};

/// A message reducible to an ordered set of signable field pairs
///
/// Implementors list every signable field as a `(declared identifier,
/// value)` pair. Listing order does not matter — [`sign`] and [`verify`]
/// sort by identifier — but identifiers must be stable across releases
/// because the gateway derives the same ordering on its side.
pub trait Signable {
    /// The (identifier, value) pairs of every populated signable field
    ///
    /// Fields with no value are omitted; fields holding collections or the
    /// signature itself are never listed.
    fn signature_pairs(&self) -> Vec<(&'static str, String)>;

    /// The signature currently attached to the message, if any
    fn signature(&self) -> Option<&str>;

    /// Attach a freshly computed signature to the message
    fn set_signature(&mut self, digest: String);
}

/// Compute the canonical digest over a set of field pairs
///
/// Sorts the pairs by identifier, drops empty values, joins the key and the
/// values with `|`, and returns the lowercase hex SHA-1 of the result.
pub fn digest(key: &str, mut pairs: Vec<(&'static str, String)>) -> String {
    pairs.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut joined = String::from(key);
    joined.push('|');

    let values: Vec<&str> = pairs
        .iter()
        .map(|(_, value)| value.as_str())
        .filter(|value| !value.is_empty())
        .collect();
    joined.push_str(&values.join("|"));

    sha1_hex(joined.as_bytes())
}

/// Compute the settlement-style digest over a single opaque data payload
///
/// The split-settlement envelope signs `key|data` as-is instead of
/// per-field pairs.
pub fn digest_data(key: &str, data: &str) -> String {
    let mut joined = String::with_capacity(key.len() + 1 + data.len());
    joined.push_str(key);
    joined.push('|');
    joined.push_str(data);
    sha1_hex(joined.as_bytes())
}

/// Sign a message in place
///
/// Any previously attached signature is discarded before the digest is
/// computed; signing is otherwise stateless.
pub fn sign<M: Signable>(message: &mut M, key: &str) {
    let computed = digest(key, message.signature_pairs());
    message.set_signature(computed);
}

/// Verify the signature attached to a received message
///
/// Re-derives the digest from the received payload using the same ordering
/// rule and compares it with the attached signature. A missing signature is
/// a mismatch. Returns `bool` rather than an error so logging-only call
/// sites can inspect the payload regardless of the outcome.
pub fn verify<M: Signable>(message: &M, key: &str) -> bool {
    match message.signature() {
        Some(attached) => digest(key, message.signature_pairs()) == attached,
        None => false,
    }
}

/// Verify a received message, reporting a mismatch as a typed error
///
/// Same check as [`verify`], for call sites that propagate instead of
/// logging. Callback handlers typically use this form.
///
/// # Errors
///
/// Returns [`GatewayError::SignatureMismatch`] carrying both the attached
/// and the recomputed digest; a missing signature mismatches with an empty
/// attached value.
pub fn check<M: Signable>(message: &M, key: &str) -> Result<(), GatewayError> {
    let computed = digest(key, message.signature_pairs());
    match message.signature() {
        Some(attached) if attached == computed => Ok(()),
        attached => Err(GatewayError::SignatureMismatch {
            expected: attached.unwrap_or_default().to_string(),
            computed,
        }),
    }
}

fn sha1_hex(input: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal signable message used to pin the digest algorithm
    struct Probe {
        pairs: Vec<(&'static str, String)>,
        signature: Option<String>,
    }

    impl Probe {
        fn new(pairs: &[(&'static str, &str)]) -> Self {
            Probe {
                pairs: pairs.iter().map(|(n, v)| (*n, v.to_string())).collect(),
                signature: None,
            }
        }
    }

    impl Signable for Probe {
        fn signature_pairs(&self) -> Vec<(&'static str, String)> {
            self.pairs.clone()
        }

        fn signature(&self) -> Option<&str> {
            self.signature.as_deref()
        }

        fn set_signature(&mut self, digest: String) {
            self.signature = Some(digest);
        }
    }

    #[test]
    fn digest_matches_gateway_reference_value() {
        // testkey|100|UAH|1396424|abc
        let pairs = vec![
            ("order_id", "abc".to_string()),
            ("amount", "100".to_string()),
            ("merchant_id", "1396424".to_string()),
            ("currency", "UAH".to_string()),
        ];
        assert_eq!(
            digest("testkey", pairs),
            "582a21db46b05d88c8727551d8c4191d5c7ce510"
        );
    }

    #[test]
    fn digest_is_invariant_under_pair_listing_order() {
        let forward = vec![
            ("amount", "100".to_string()),
            ("currency", "UAH".to_string()),
            ("order_id", "abc".to_string()),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(digest("k", forward), digest("k", reversed));
    }

    #[test]
    fn empty_values_are_dropped_from_the_join() {
        let with_empty = vec![
            ("amount", "100".to_string()),
            ("currency", String::new()),
            ("order_id", "abc".to_string()),
        ];
        let without = vec![
            ("amount", "100".to_string()),
            ("order_id", "abc".to_string()),
        ];
        assert_eq!(digest("k", with_empty), digest("k", without));
    }

    #[test]
    fn empty_message_digests_key_and_separator_only() {
        // sha1("secret|")
        assert_eq!(
            digest("secret", Vec::new()),
            "f36ec9efbeba9c7505808884d903577aa03daed0"
        );
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let mut probe = Probe::new(&[("amount", "100"), ("currency", "UAH")]);
        sign(&mut probe, "k");
        assert!(verify(&probe, "k"));
        assert!(!verify(&probe, "other-key"));
    }

    #[test]
    fn verify_rejects_missing_signature() {
        let probe = Probe::new(&[("amount", "100")]);
        assert!(!verify(&probe, "k"));
    }

    #[test]
    fn check_reports_both_digests_on_mismatch() {
        let mut probe = Probe::new(&[("amount", "100")]);
        sign(&mut probe, "k");
        assert!(check(&probe, "k").is_ok());

        let attached = probe.signature.clone().unwrap();
        let err = check(&probe, "other-key").unwrap_err();
        match err {
            GatewayError::SignatureMismatch { expected, computed } => {
                assert_eq!(expected, attached);
                assert_ne!(computed, attached);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn verify_rejects_tampered_payload() {
        let mut probe = Probe::new(&[("amount", "100")]);
        sign(&mut probe, "k");
        probe.pairs[0].1 = "999".to_string();
        assert!(!verify(&probe, "k"));
    }

    #[test]
    fn settlement_digest_signs_key_and_data() {
        // sha1("key|eyJvcmRlciI6e319")
        assert_eq!(
            digest_data("key", "eyJvcmRlciI6e319"),
            "08fdda0c656203e5334e163c9692e90ee17d8b0f"
        );
    }
}
