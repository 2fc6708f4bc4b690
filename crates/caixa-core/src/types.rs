//! # Domain Types
//!
//! Core domain types for the till session lifecycle.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐   ┌─────────────────┐   │
//! │  │    Terminal     │   │  RegisterSession    │   │    Movement     │   │
//! │  │  ─────────────  │   │  ─────────────────  │   │  ─────────────  │   │
//! │  │  id (UUID)      │   │  id (UUID)          │   │  id (UUID)      │   │
//! │  │  name           │◄──│  terminal_id (FK)   │◄──│  session_id(FK) │   │
//! │  │                 │   │  operator_id        │   │  kind           │   │
//! │  │                 │   │  status             │   │  amount_cents   │   │
//! │  │                 │   │  opening_balance    │   │  sequence       │   │
//! │  └─────────────────┘   └─────────────────────┘   └─────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │  SessionStatus  │   │  MovementKind   │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  Open           │   │  Opening        │                             │
//! │  │  Closed         │   │  SaleCash       │                             │
//! │  └─────────────────┘   │  Sangria        │                             │
//! │                        │  Suprimento     │                             │
//! │                        │  Closing        │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sign Convention
//! Movement amounts are stored non-negative; the direction of a movement is
//! implied by its kind. [`Movement::signed_cents`] is the single place that
//! convention is encoded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Terminal
// =============================================================================

/// A physical point-of-sale station.
///
/// Static reference data: seeded at install time, never mutated by the
/// engine. A terminal hosts at most one open session at a time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Terminal {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on reports ("Front Desk", "Grooming Counter").
    pub name: String,

    /// When the terminal was registered.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Session Status
// =============================================================================

/// The status of a register session.
///
/// A session is created `Open` and leaves that state exactly once, through
/// the close operation. There is no third state and no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Session is accepting movements.
    Open,
    /// Session has been reconciled and frozen.
    Closed,
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Open
    }
}

// =============================================================================
// Register Session
// =============================================================================

/// One opening-to-closing cycle of cash custody on a terminal.
///
/// ## Frozen-at-close Fields
/// `closing_balance_cents` (the physically counted amount) and
/// `expected_balance_cents` (the replayed ledger balance) are `None` while
/// the session is open and set exactly once when it closes. After that the
/// whole row is immutable; sessions are retained forever for audit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RegisterSession {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Terminal this session belongs to.
    pub terminal_id: String,

    /// Operator who opened the session (externally authenticated).
    pub operator_id: String,

    /// Current lifecycle state.
    pub status: SessionStatus,

    /// Starting float, in cents.
    pub opening_balance_cents: i64,

    /// Physically counted amount at close, in cents.
    pub closing_balance_cents: Option<i64>,

    /// Ledger-derived balance frozen at close, in cents.
    pub expected_balance_cents: Option<i64>,

    /// Free-form notes (open notes, plus close notes appended).
    pub notes: Option<String>,

    /// When the session was opened.
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,

    /// When the session was closed.
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl RegisterSession {
    /// Returns the opening float as a Money type.
    #[inline]
    pub fn opening_balance(&self) -> Money {
        Money::from_cents(self.opening_balance_cents)
    }

    /// Checks whether the session still accepts movements.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }
}

// =============================================================================
// Movement Kind
// =============================================================================

/// The kind of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// The starting float, recorded once when the session opens.
    Opening,
    /// A cash sale, appended by the external checkout collaborator.
    SaleCash,
    /// A withdrawal from the till (bank deposit, security sweep).
    Sangria,
    /// A cash top-up added during the session.
    Suprimento,
    /// The counted amount, recorded once when the session closes.
    Closing,
}

impl MovementKind {
    /// Kinds a caller may append while the session is open.
    ///
    /// `Opening` and `Closing` are bookkeeping records written internally by
    /// the open/close transitions, never through the append path.
    #[inline]
    pub const fn is_appendable(&self) -> bool {
        matches!(
            self,
            MovementKind::SaleCash | MovementKind::Sangria | MovementKind::Suprimento
        )
    }
}

// =============================================================================
// Movement
// =============================================================================

/// One atomic monetary event tied to a session.
///
/// Movements are append-only: once committed they are never updated or
/// deleted, which is what makes the ledger replayable for audit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Movement {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Session this movement belongs to.
    pub session_id: String,

    /// Direction-implying kind.
    pub kind: MovementKind,

    /// Amount in cents. Always >= 0; sign is implied by `kind`.
    pub amount_cents: i64,

    /// Justification. Required for sangria, optional elsewhere.
    pub reason: Option<String>,

    /// Payment sub-method tag on cash sales ("cash", "cash_on_delivery").
    /// Used by the category summary; untagged sales are fine.
    pub sub_method: Option<String>,

    /// Actor who caused the movement (externally authenticated).
    pub created_by: String,

    /// When the movement was recorded.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// Per-session strictly increasing counter; breaks ties between
    /// movements that share a timestamp.
    pub sequence: i64,
}

impl Movement {
    /// Returns the amount as a Money type.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// The movement's contribution to the session balance, in cents.
    ///
    /// ```text
    /// Opening     +amount   (the starting float)
    /// SaleCash    +amount
    /// Suprimento  +amount
    /// Sangria     -amount
    /// Closing      0        (records the counted amount; not a flow)
    /// ```
    #[inline]
    pub fn signed_cents(&self) -> i64 {
        match self.kind {
            MovementKind::Opening | MovementKind::SaleCash | MovementKind::Suprimento => {
                self.amount_cents
            }
            MovementKind::Sangria => -self.amount_cents,
            MovementKind::Closing => 0,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn movement(kind: MovementKind, amount_cents: i64) -> Movement {
        Movement {
            id: "m-1".to_string(),
            session_id: "s-1".to_string(),
            kind,
            amount_cents,
            reason: None,
            sub_method: None,
            created_by: "op-1".to_string(),
            created_at: Utc::now(),
            sequence: 1,
        }
    }

    #[test]
    fn test_signed_contribution() {
        assert_eq!(movement(MovementKind::Opening, 100).signed_cents(), 100);
        assert_eq!(movement(MovementKind::SaleCash, 100).signed_cents(), 100);
        assert_eq!(movement(MovementKind::Suprimento, 100).signed_cents(), 100);
        assert_eq!(movement(MovementKind::Sangria, 100).signed_cents(), -100);
        assert_eq!(movement(MovementKind::Closing, 100).signed_cents(), 0);
    }

    #[test]
    fn test_appendable_kinds() {
        assert!(MovementKind::SaleCash.is_appendable());
        assert!(MovementKind::Sangria.is_appendable());
        assert!(MovementKind::Suprimento.is_appendable());
        assert!(!MovementKind::Opening.is_appendable());
        assert!(!MovementKind::Closing.is_appendable());
    }

    #[test]
    fn test_session_status_serde_names() {
        let open = serde_json::to_string(&SessionStatus::Open).unwrap();
        assert_eq!(open, "\"open\"");
        let kind = serde_json::to_string(&MovementKind::SaleCash).unwrap();
        assert_eq!(kind, "\"sale_cash\"");
    }
}
