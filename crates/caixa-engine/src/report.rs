//! # Report Generator
//!
//! Read-only aggregation of a session into a presentation-ready summary.
//!
//! ## Consistency
//! The session row and its movement list are read in ONE snapshot (a single
//! read transaction), so a writer committing on another connection can
//! never tear the report. For a closed session the inputs are frozen, so
//! repeated calls return identical summaries.

use tracing::debug;

use caixa_core::reconcile::reconcile;
use caixa_core::{balance, Money};
use caixa_db::Database;

use crate::dto::{MovementDto, SessionDto, SessionReport};
use crate::error::{EngineError, EngineResult};

/// Builds session reports.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    db: Database,
    tolerance_cents: i64,
}

impl ReportGenerator {
    /// Creates a generator. `tolerance_cents` matches the engine policy so
    /// a report classifies exactly the way close did.
    pub fn new(db: Database, tolerance_cents: i64) -> Self {
        ReportGenerator {
            db,
            tolerance_cents,
        }
    }

    /// Generates the report for one session.
    ///
    /// Combines session metadata, the category totals, the reconciliation
    /// summary (closed sessions only, built from the FROZEN balances, not
    /// a recount) and the full ordered movement list.
    pub async fn generate(&self, session_id: &str) -> EngineResult<SessionReport> {
        debug!(session_id, "generate report");

        let (session, movements) = self
            .db
            .sessions()
            .snapshot(session_id)
            .await
            .map_err(EngineError::from)?
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))?;

        let terminal_name = self
            .db
            .terminals()
            .get_by_id(&session.terminal_id)
            .await
            .map_err(EngineError::from)?
            .map(|t| t.name)
            .unwrap_or_else(|| session.terminal_id.clone());

        let totals = balance::compute_by_category(&movements);
        let current = balance::compute_balance(&movements);

        let reconciliation = match (session.expected_balance_cents, session.closing_balance_cents)
        {
            (Some(expected), Some(counted)) => Some(
                reconcile(
                    Money::from_cents(expected),
                    Money::from_cents(counted),
                    self.tolerance_cents,
                )
                .into(),
            ),
            _ => None,
        };

        Ok(SessionReport {
            session: SessionDto::from(session),
            terminal_name,
            balance_cents: current.cents(),
            balance: current.to_decimal_string(),
            totals,
            reconciliation,
            movements: movements.into_iter().map(MovementDto::from).collect(),
        })
    }
}
