//! Split-settlement share allocation
//!
//! Converts a captured amount and a validated percentage set into concrete
//! per-receiver shares, enforcing exact reconciliation before anything is
//! sent to the gateway.

use crate::types::error::GatewayError;
use crate::types::merchant::SplitAccount;

/// One receiver's computed share of a split settlement
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Receiving merchant identifier
    pub merchant_id: String,
    /// Share in minor currency units
    pub amount: i64,
    /// Settlement description carried over from the split account
    pub description: String,
}

/// Allocate a total amount across the configured split accounts
///
/// Each share is `total * percentage / 100`, truncated toward zero. The
/// truncation is intentional wire compatibility: the gateway computes the
/// same shares on its side and the two must agree. Because truncation can
/// lose minor units, the shares are summed back and compared against the
/// total; any shortfall aborts the settlement locally.
///
/// # Errors
///
/// Returns [`GatewayError::SplitAllocation`] when the truncated shares do
/// not sum back to `total`.
pub fn allocate(
    order_id: &str,
    total: i64,
    accounts: &[SplitAccount],
) -> Result<Vec<Allocation>, GatewayError> {
    let mut allocations = Vec::with_capacity(accounts.len());
    let mut allocated: i64 = 0;

    for account in accounts {
        let share = (total as f64 * account.percentage / 100.0) as i64;
        allocated += share;
        allocations.push(Allocation {
            merchant_id: account.merchant_id.clone(),
            amount: share,
            description: account.description.clone(),
        });
    }

    if allocated != total {
        return Err(GatewayError::SplitAllocation {
            order_id: order_id.to_string(),
            total,
            allocated,
        });
    }

    Ok(allocations)
}
