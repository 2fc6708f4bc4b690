//! # Reconciliation Engine
//!
//! Compares a physically counted amount against the ledger-derived expected
//! balance and classifies the outcome.
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  difference = counted − expected                                        │
//! │                                                                         │
//! │  |difference| <= tolerance  →  Balanced                                 │
//! │   difference  >  0          →  Surplus   (too much cash in the drawer)  │
//! │   difference  <  0          →  Shortage  (cash is missing)              │
//! │                                                                         │
//! │  The raw numbers are ALWAYS preserved. Classification labels the        │
//! │  discrepancy for the report; it never corrects it.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tolerance is expressed in minor units. The engine's arithmetic is pure
//! integer, so the default tolerance is 0; a deployment may allow a one-cent
//! grace through the engine policy.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Classification
// =============================================================================

/// The audited outcome of comparing counted cash against the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Counted matches expected within tolerance.
    Balanced,
    /// More cash in the drawer than the ledger accounts for.
    Surplus,
    /// Less cash in the drawer than the ledger accounts for.
    Shortage,
}

// =============================================================================
// Reconciliation Summary
// =============================================================================

/// The result of reconciling a session at close.
///
/// Frozen into the close response and reproducible from the session row:
/// `expected` and `counted` are both persisted, so the summary can be
/// recomputed for any closed session at any later time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReconciliationSummary {
    /// Ledger-derived balance, in cents.
    pub expected_cents: i64,

    /// Physically counted amount, in cents.
    pub counted_cents: i64,

    /// `counted − expected`, in cents. Negative means cash is missing.
    pub difference_cents: i64,

    /// Classified outcome.
    pub classification: Classification,
}

/// Classifies the difference between a counted amount and the expected
/// balance. Pure; does not alter either value.
pub fn reconcile(expected: Money, counted: Money, tolerance_cents: i64) -> ReconciliationSummary {
    let difference = counted - expected;

    let classification = if difference.abs().cents() <= tolerance_cents {
        Classification::Balanced
    } else if difference.is_positive() {
        Classification::Surplus
    } else {
        Classification::Shortage
    };

    ReconciliationSummary {
        expected_cents: expected.cents(),
        counted_cents: counted.cents(),
        difference_cents: difference.cents(),
        classification,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_is_balanced() {
        let summary = reconcile(Money::from_cents(10000), Money::from_cents(10000), 0);
        assert_eq!(summary.classification, Classification::Balanced);
        assert_eq!(summary.difference_cents, 0);
    }

    #[test]
    fn test_shortage() {
        let summary = reconcile(Money::from_cents(10000), Money::from_cents(9950), 0);
        assert_eq!(summary.classification, Classification::Shortage);
        assert_eq!(summary.difference_cents, -50);
        // raw numbers preserved
        assert_eq!(summary.expected_cents, 10000);
        assert_eq!(summary.counted_cents, 9950);
    }

    #[test]
    fn test_surplus() {
        let summary = reconcile(Money::from_cents(10000), Money::from_cents(10025), 0);
        assert_eq!(summary.classification, Classification::Surplus);
        assert_eq!(summary.difference_cents, 25);
    }

    #[test]
    fn test_tolerance_absorbs_one_cent_both_ways() {
        let expected = Money::from_cents(10000);
        assert_eq!(
            reconcile(expected, Money::from_cents(10001), 1).classification,
            Classification::Balanced
        );
        assert_eq!(
            reconcile(expected, Money::from_cents(9999), 1).classification,
            Classification::Balanced
        );
        // one past tolerance is classified again
        assert_eq!(
            reconcile(expected, Money::from_cents(10002), 1).classification,
            Classification::Surplus
        );
        assert_eq!(
            reconcile(expected, Money::from_cents(9998), 1).classification,
            Classification::Shortage
        );
    }

    #[test]
    fn test_tolerance_never_alters_difference() {
        let summary = reconcile(Money::from_cents(10000), Money::from_cents(10001), 1);
        assert_eq!(summary.difference_cents, 1);
    }
}
