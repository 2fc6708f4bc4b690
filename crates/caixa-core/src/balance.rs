//! # Balance Calculator
//!
//! Pure functions deriving the session balance and per-category totals from
//! the movement ledger.
//!
//! ## The Balance Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   balance = opening + Σ suprimento + Σ sale_cash − Σ sangria            │
//! │                                                                         │
//! │   Recomputed fresh from the full movement list on EVERY call.           │
//! │   There is no denormalized running total anywhere in the system,        │
//! │   so there is nothing that can drift.                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No I/O, no side effects, deterministic given the same movement list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;
use crate::types::{Movement, MovementKind};

// =============================================================================
// Balance Replay
// =============================================================================

/// Computes the session balance by replaying the full movement list.
///
/// The opening float enters through the `opening` movement, so the result is
/// derived strictly from recorded movements. The `closing` movement (when
/// present) contributes zero: it records the counted amount, not a flow.
///
/// ## Example
/// ```rust,ignore
/// let balance = compute_balance(&ledger.list_by_session(id).await?);
/// ```
pub fn compute_balance(movements: &[Movement]) -> Money {
    Money::from_cents(movements.iter().map(Movement::signed_cents).sum())
}

/// Checks whether a withdrawal of `amount` is covered by the balance
/// computed from all movements recorded so far.
///
/// Returns the current balance on success so callers don't replay twice.
pub fn ensure_can_withdraw(movements: &[Movement], amount: Money) -> Result<Money, CoreError> {
    let available = compute_balance(movements);
    if amount > available {
        return Err(CoreError::InsufficientBalance {
            requested_cents: amount.cents(),
            available_cents: available.cents(),
        });
    }
    Ok(available)
}

// =============================================================================
// Category Totals
// =============================================================================

/// Count and amount of one movement category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryTotal {
    pub count: u32,
    pub amount_cents: i64,
}

impl CategoryTotal {
    fn record(&mut self, amount_cents: i64) {
        self.count += 1;
        self.amount_cents += amount_cents;
    }
}

/// Cash-sale subtotal for one payment sub-method tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SubMethodTotal {
    pub sub_method: String,
    pub count: u32,
    pub amount_cents: i64,
}

/// Per-category totals over a session's movements, for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryTotals {
    /// The starting float (the `opening` movement).
    pub opening_cents: i64,

    /// Cash sales appended by the checkout collaborator.
    pub sale_cash: CategoryTotal,

    /// Withdrawals from the till.
    pub sangria: CategoryTotal,

    /// Cash top-ups.
    pub suprimento: CategoryTotal,

    /// Cash sales grouped by sub-method tag, sorted by tag for stable
    /// output. Untagged sales are counted in `sale_cash` only.
    pub sale_cash_by_sub_method: Vec<SubMethodTotal>,
}

/// Groups movements into per-category totals.
///
/// Deterministic: the sub-method breakdown is sorted by tag, so the same
/// movement list always produces the same (byte-identical) summary.
pub fn compute_by_category(movements: &[Movement]) -> CategoryTotals {
    let mut totals = CategoryTotals::default();
    let mut by_sub_method: BTreeMap<&str, CategoryTotal> = BTreeMap::new();

    for m in movements {
        match m.kind {
            MovementKind::Opening => totals.opening_cents += m.amount_cents,
            MovementKind::SaleCash => {
                totals.sale_cash.record(m.amount_cents);
                if let Some(tag) = m.sub_method.as_deref() {
                    by_sub_method.entry(tag).or_default().record(m.amount_cents);
                }
            }
            MovementKind::Sangria => totals.sangria.record(m.amount_cents),
            MovementKind::Suprimento => totals.suprimento.record(m.amount_cents),
            MovementKind::Closing => {}
        }
    }

    totals.sale_cash_by_sub_method = by_sub_method
        .into_iter()
        .map(|(sub_method, t)| SubMethodTotal {
            sub_method: sub_method.to_string(),
            count: t.count,
            amount_cents: t.amount_cents,
        })
        .collect();

    totals
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn movement(kind: MovementKind, amount_cents: i64, seq: i64) -> Movement {
        Movement {
            id: format!("m-{seq}"),
            session_id: "s-1".to_string(),
            kind,
            amount_cents,
            reason: None,
            sub_method: None,
            created_by: "op-1".to_string(),
            created_at: Utc::now(),
            sequence: seq,
        }
    }

    fn tagged_sale(amount_cents: i64, tag: &str, seq: i64) -> Movement {
        Movement {
            sub_method: Some(tag.to_string()),
            ..movement(MovementKind::SaleCash, amount_cents, seq)
        }
    }

    #[test]
    fn test_balance_identity() {
        // opening 10000 + suprimento 5000 + sale 3000 - sangria 8000 = 10000
        let movements = vec![
            movement(MovementKind::Opening, 10000, 1),
            movement(MovementKind::Suprimento, 5000, 2),
            movement(MovementKind::SaleCash, 3000, 3),
            movement(MovementKind::Sangria, 8000, 4),
        ];
        assert_eq!(compute_balance(&movements).cents(), 10000);
    }

    #[test]
    fn test_closing_movement_is_not_a_flow() {
        let movements = vec![
            movement(MovementKind::Opening, 10000, 1),
            movement(MovementKind::Closing, 9950, 2),
        ];
        assert_eq!(compute_balance(&movements).cents(), 10000);
    }

    #[test]
    fn test_empty_ledger_is_zero() {
        assert_eq!(compute_balance(&[]).cents(), 0);
    }

    #[test]
    fn test_withdraw_exact_balance_allowed() {
        let movements = vec![movement(MovementKind::Opening, 10000, 1)];
        let available = ensure_can_withdraw(&movements, Money::from_cents(10000)).unwrap();
        assert_eq!(available.cents(), 10000);
    }

    #[test]
    fn test_withdraw_one_cent_over_rejected() {
        let movements = vec![movement(MovementKind::Opening, 10000, 1)];
        let err = ensure_can_withdraw(&movements, Money::from_cents(10001)).unwrap_err();
        match err {
            CoreError::InsufficientBalance {
                requested_cents,
                available_cents,
            } => {
                assert_eq!(requested_cents, 10001);
                assert_eq!(available_cents, 10000);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_category_totals() {
        let movements = vec![
            movement(MovementKind::Opening, 10000, 1),
            movement(MovementKind::Suprimento, 5000, 2),
            tagged_sale(3000, "cash", 3),
            tagged_sale(2000, "cash_on_delivery", 4),
            movement(MovementKind::SaleCash, 1000, 5), // untagged
            movement(MovementKind::Sangria, 8000, 6),
        ];

        let totals = compute_by_category(&movements);
        assert_eq!(totals.opening_cents, 10000);
        assert_eq!(totals.suprimento, CategoryTotal { count: 1, amount_cents: 5000 });
        assert_eq!(totals.sangria, CategoryTotal { count: 1, amount_cents: 8000 });
        assert_eq!(totals.sale_cash, CategoryTotal { count: 3, amount_cents: 6000 });

        // sorted by tag; untagged sale only in the overall total
        assert_eq!(totals.sale_cash_by_sub_method.len(), 2);
        assert_eq!(totals.sale_cash_by_sub_method[0].sub_method, "cash");
        assert_eq!(totals.sale_cash_by_sub_method[0].amount_cents, 3000);
        assert_eq!(totals.sale_cash_by_sub_method[1].sub_method, "cash_on_delivery");
    }

    #[test]
    fn test_summary_is_deterministic() {
        let movements = vec![
            movement(MovementKind::Opening, 10000, 1),
            tagged_sale(3000, "cash", 2),
        ];
        assert_eq!(compute_by_category(&movements), compute_by_category(&movements));
    }
}
