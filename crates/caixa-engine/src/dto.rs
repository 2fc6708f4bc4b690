//! # Client Contract DTOs
//!
//! Serializable response shapes for the operation surface. This is where
//! integer minor units meet their decimal-string presentation: every
//! monetary field carries both (`…Cents` and the formatted string), and the
//! string is produced by [`Money::to_decimal_string`]; nothing downstream
//! ever re-derives it from floats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use caixa_core::{
    CategoryTotals, Classification, Money, Movement, MovementKind, ReconciliationSummary,
    RegisterSession, SessionStatus,
};

// =============================================================================
// Session
// =============================================================================

/// A register session as callers see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionDto {
    pub id: String,
    pub terminal_id: String,
    pub operator_id: String,
    pub status: SessionStatus,

    pub opening_balance_cents: i64,
    pub opening_balance: String,

    pub closing_balance_cents: Option<i64>,
    pub closing_balance: Option<String>,

    pub expected_balance_cents: Option<i64>,
    pub expected_balance: Option<String>,

    pub notes: Option<String>,

    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl From<RegisterSession> for SessionDto {
    fn from(s: RegisterSession) -> Self {
        let decimal = |cents: i64| Money::from_cents(cents).to_decimal_string();
        SessionDto {
            opening_balance: decimal(s.opening_balance_cents),
            closing_balance: s.closing_balance_cents.map(decimal),
            expected_balance: s.expected_balance_cents.map(decimal),
            id: s.id,
            terminal_id: s.terminal_id,
            operator_id: s.operator_id,
            status: s.status,
            opening_balance_cents: s.opening_balance_cents,
            closing_balance_cents: s.closing_balance_cents,
            expected_balance_cents: s.expected_balance_cents,
            notes: s.notes,
            opened_at: s.opened_at,
            closed_at: s.closed_at,
        }
    }
}

// =============================================================================
// Movement
// =============================================================================

/// One ledger entry as callers see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MovementDto {
    pub id: String,
    pub session_id: String,
    pub kind: MovementKind,
    pub amount_cents: i64,
    pub amount: String,
    pub reason: Option<String>,
    pub sub_method: Option<String>,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub sequence: i64,
}

impl From<Movement> for MovementDto {
    fn from(m: Movement) -> Self {
        MovementDto {
            amount: m.amount().to_decimal_string(),
            id: m.id,
            session_id: m.session_id,
            kind: m.kind,
            amount_cents: m.amount_cents,
            reason: m.reason,
            sub_method: m.sub_method,
            created_by: m.created_by,
            created_at: m.created_at,
            sequence: m.sequence,
        }
    }
}

// =============================================================================
// Operation Responses
// =============================================================================

/// Response of the status operation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StatusResponse {
    pub is_open: bool,
    pub session: Option<SessionDto>,
}

/// Response of suprimento / sangria / cash-sale: the committed movement
/// plus the balance recomputed from the full ledger afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MovementResponse {
    pub movement: MovementDto,
    pub balance_cents: i64,
    pub balance: String,
}

/// Reconciliation summary with decimal presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReconciliationDto {
    pub expected_cents: i64,
    pub expected: String,
    pub counted_cents: i64,
    pub counted: String,
    pub difference_cents: i64,
    pub difference: String,
    pub classification: Classification,
}

impl From<ReconciliationSummary> for ReconciliationDto {
    fn from(s: ReconciliationSummary) -> Self {
        let decimal = |cents: i64| Money::from_cents(cents).to_decimal_string();
        ReconciliationDto {
            expected: decimal(s.expected_cents),
            counted: decimal(s.counted_cents),
            difference: decimal(s.difference_cents),
            expected_cents: s.expected_cents,
            counted_cents: s.counted_cents,
            difference_cents: s.difference_cents,
            classification: s.classification,
        }
    }
}

/// Response of the close operation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CloseResponse {
    pub session: SessionDto,
    pub summary: ReconciliationDto,
}

// =============================================================================
// Session Report
// =============================================================================

/// The full session report: metadata, category totals, reconciliation
/// (closed sessions only) and the complete ordered movement list.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionReport {
    pub session: SessionDto,

    /// Display name of the session's terminal.
    pub terminal_name: String,

    /// Balance replayed from the ledger at report time. For a closed
    /// session this equals the frozen expected balance.
    pub balance_cents: i64,
    pub balance: String,

    pub totals: CategoryTotals,

    /// Present once the session is closed.
    pub reconciliation: Option<ReconciliationDto>,

    /// All movements, ordered by (created_at, sequence).
    pub movements: Vec<MovementDto>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_session_dto_formats_decimals() {
        let session = RegisterSession {
            id: "s-1".to_string(),
            terminal_id: "t-1".to_string(),
            operator_id: "op-1".to_string(),
            status: SessionStatus::Closed,
            opening_balance_cents: 10000,
            closing_balance_cents: Some(9950),
            expected_balance_cents: Some(10000),
            notes: None,
            opened_at: Utc::now(),
            closed_at: Some(Utc::now()),
        };

        let dto = SessionDto::from(session);
        assert_eq!(dto.opening_balance, "100.00");
        assert_eq!(dto.closing_balance.as_deref(), Some("99.50"));
        assert_eq!(dto.expected_balance.as_deref(), Some("100.00"));
    }

    #[test]
    fn test_reconciliation_dto_keeps_sign() {
        let summary = caixa_core::reconcile(
            Money::from_cents(10000),
            Money::from_cents(9950),
            0,
        );
        let dto = ReconciliationDto::from(summary);
        assert_eq!(dto.difference_cents, -50);
        assert_eq!(dto.difference, "-0.50");

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["classification"], "shortage");
        assert_eq!(json["differenceCents"], -50);
    }
}
