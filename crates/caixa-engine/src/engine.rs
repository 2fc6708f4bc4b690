//! # Till Engine
//!
//! The session state machine: the only write path into a register session.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Per-Terminal Lifecycle                                  │
//! │                                                                         │
//! │        open(terminal, operator, float)                                  │
//! │  NoOpenSession ────────────────────────► HasOpenSession                 │
//! │        ▲                                      │                         │
//! │        │                                      │ suprimento / sangria /  │
//! │        │                                      │ sale_cash  (repeats)    │
//! │        │                                      ▼                         │
//! │        └──────────────────────────── close(counted)                     │
//! │                                      └── reconcile, freeze, append      │
//! │                                          `closing`, flip to Closed     │
//! │                                                                         │
//! │  Every operation:                                                       │
//! │    1. validate input            (nothing persisted on failure)          │
//! │    2. acquire the keyed lock    (terminal for open, session otherwise)  │
//! │    3. check preconditions       (typed StateError on violation)         │
//! │    4. mutate in ONE transaction (bounded retry on SQLITE_BUSY)          │
//! │    5. recompute balance fresh   (never a cached counter)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use caixa_core::reconcile::reconcile;
use caixa_core::validation::{
    normalize_optional_reason, validate_counted_balance, validate_movement_amount,
    validate_notes, validate_opening_balance, validate_sangria_reason,
};
use caixa_core::{
    balance, Classification, Money, Movement, MovementKind, RegisterSession, SessionStatus,
};
use caixa_db::{Database, DbError, NewMovement};

use crate::dto::{CloseResponse, MovementResponse, SessionDto, SessionReport, StatusResponse};
use crate::error::{EngineError, EngineResult};
use crate::lock::KeyedLock;
use crate::policy::EnginePolicy;
use crate::report::ReportGenerator;
use crate::retry::retry_transient;

// =============================================================================
// Till Engine
// =============================================================================

/// The till session engine.
///
/// Holds the database handle, the policy and the keyed locks. One instance
/// serves every terminal of the store; operations against different
/// terminals or sessions run fully in parallel.
#[derive(Debug)]
pub struct TillEngine {
    db: Database,
    policy: EnginePolicy,
    terminal_locks: KeyedLock,
    session_locks: KeyedLock,
}

impl TillEngine {
    /// Creates an engine with the default policy.
    pub fn new(db: Database) -> Self {
        Self::with_policy(db, EnginePolicy::default())
    }

    /// Creates an engine with an explicit policy.
    pub fn with_policy(db: Database, policy: EnginePolicy) -> Self {
        TillEngine {
            db,
            policy,
            terminal_locks: KeyedLock::new(),
            session_locks: KeyedLock::new(),
        }
    }

    /// The active policy.
    pub fn policy(&self) -> &EnginePolicy {
        &self.policy
    }

    // =========================================================================
    // Open
    // =========================================================================

    /// Opens a register session on a terminal with a starting float.
    ///
    /// Creates the session row and its `opening` movement in one
    /// transaction. Fails with [`EngineError::AlreadyOpen`] if the terminal
    /// already has an open session; under concurrency, exactly one of N
    /// racing opens succeeds.
    pub async fn open(
        &self,
        terminal_id: &str,
        operator_id: &str,
        opening_balance_cents: i64,
        notes: Option<&str>,
    ) -> EngineResult<SessionDto> {
        debug!(terminal_id, operator_id, opening_balance = opening_balance_cents, "open");

        validate_opening_balance(opening_balance_cents)?;
        validate_notes(notes, self.policy.max_notes_len)?;

        // Serialize opens per terminal so both racers don't pass the status
        // check; the partial unique index backstops anything we miss.
        let _guard = self.terminal_locks.acquire(terminal_id).await;

        if self.db.terminals().get_by_id(terminal_id).await.map_err(map_db)?.is_none() {
            return Err(EngineError::TerminalNotFound(terminal_id.to_string()));
        }

        if let Some(existing) = self
            .db
            .sessions()
            .find_open_by_terminal(terminal_id)
            .await
            .map_err(map_db)?
        {
            return Err(EngineError::AlreadyOpen {
                terminal_id: terminal_id.to_string(),
                session_id: existing.id,
            });
        }

        let now = Utc::now();
        let session = RegisterSession {
            id: Uuid::new_v4().to_string(),
            terminal_id: terminal_id.to_string(),
            operator_id: operator_id.to_string(),
            status: SessionStatus::Open,
            opening_balance_cents,
            closing_balance_cents: None,
            expected_balance_cents: None,
            notes: normalize_optional_reason(notes),
            opened_at: now,
            closed_at: None,
        };
        let opening = Movement {
            id: Uuid::new_v4().to_string(),
            session_id: session.id.clone(),
            kind: MovementKind::Opening,
            amount_cents: opening_balance_cents,
            reason: None,
            sub_method: None,
            created_by: operator_id.to_string(),
            created_at: now,
            sequence: 1,
        };

        let sessions = self.db.sessions();
        let insert = retry_transient(
            "open",
            self.policy.max_retries,
            self.policy.initial_backoff,
            self.policy.max_backoff,
            || {
                let sessions = sessions.clone();
                let session = &session;
                let opening = &opening;
                async move { sessions.insert_open(session, opening).await }
            },
        )
        .await;

        match insert {
            Ok(()) => {}
            // Lost the index race to an open that slipped past the lock
            // (e.g. another process on the same database file).
            Err(DbError::UniqueViolation { .. }) => {
                let winner = self
                    .db
                    .sessions()
                    .find_open_by_terminal(terminal_id)
                    .await
                    .map_err(map_db)?;
                return Err(EngineError::AlreadyOpen {
                    terminal_id: terminal_id.to_string(),
                    session_id: winner.map(|s| s.id).unwrap_or_else(|| "unknown".to_string()),
                });
            }
            Err(other) => return Err(map_db(other)),
        }

        info!(
            session_id = %session.id,
            terminal_id,
            operator_id,
            opening_balance = opening_balance_cents,
            "Session opened"
        );

        Ok(SessionDto::from(session))
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Reports whether a terminal has an open session. Read-only.
    pub async fn status_of(&self, terminal_id: &str) -> EngineResult<StatusResponse> {
        let session = self
            .db
            .sessions()
            .find_open_by_terminal(terminal_id)
            .await
            .map_err(map_db)?;

        Ok(StatusResponse {
            is_open: session.is_some(),
            session: session.map(SessionDto::from),
        })
    }

    // =========================================================================
    // Movements
    // =========================================================================

    /// Records a cash top-up. Reason is optional.
    pub async fn suprimento(
        &self,
        session_id: &str,
        amount_cents: i64,
        reason: Option<&str>,
        actor_id: &str,
    ) -> EngineResult<MovementResponse> {
        debug!(session_id, amount = amount_cents, "suprimento");

        validate_movement_amount(amount_cents)?;
        let reason = normalize_optional_reason(reason);

        self.append_movement(session_id, MovementKind::Suprimento, amount_cents, reason, None, actor_id)
            .await
    }

    /// Records a cash withdrawal.
    ///
    /// Requires a reason of at least the policy minimum length, and fails
    /// with [`EngineError::InsufficientBalance`] if the amount exceeds the
    /// balance computed from all movements recorded so far.
    pub async fn sangria(
        &self,
        session_id: &str,
        amount_cents: i64,
        reason: Option<&str>,
        actor_id: &str,
    ) -> EngineResult<MovementResponse> {
        debug!(session_id, amount = amount_cents, "sangria");

        validate_movement_amount(amount_cents)?;
        let reason = validate_sangria_reason(reason, self.policy.sangria_reason_min_len)?;

        self.append_movement(
            session_id,
            MovementKind::Sangria,
            amount_cents,
            Some(reason),
            None,
            actor_id,
        )
        .await
    }

    /// Records a cash sale, appended by the checkout collaborator (not
    /// user-initiated from the till UI). `sub_method` is an optional tag
    /// the category summary groups by.
    pub async fn record_cash_sale(
        &self,
        session_id: &str,
        amount_cents: i64,
        sub_method: Option<&str>,
        actor_id: &str,
    ) -> EngineResult<MovementResponse> {
        debug!(session_id, amount = amount_cents, "record_cash_sale");

        validate_movement_amount(amount_cents)?;
        let sub_method = normalize_optional_reason(sub_method);

        self.append_movement(session_id, MovementKind::SaleCash, amount_cents, None, sub_method, actor_id)
            .await
    }

    /// Common append path: lock the session, check it is open, enforce the
    /// sangria balance rule against the current ledger, append, and answer
    /// with the balance recomputed from the full ledger.
    async fn append_movement(
        &self,
        session_id: &str,
        kind: MovementKind,
        amount_cents: i64,
        reason: Option<String>,
        sub_method: Option<String>,
        actor_id: &str,
    ) -> EngineResult<MovementResponse> {
        let _guard = self.session_locks.acquire(session_id).await;

        let session = self.load_session(session_id).await?;
        if !session.is_open() {
            return Err(EngineError::SessionClosed(session_id.to_string()));
        }

        if kind == MovementKind::Sangria {
            let movements = self
                .db
                .movements()
                .list_by_session(session_id)
                .await
                .map_err(map_db)?;
            balance::ensure_can_withdraw(&movements, Money::from_cents(amount_cents))?;
        }

        let new = NewMovement {
            session_id: session_id.to_string(),
            kind,
            amount_cents,
            reason,
            sub_method,
            created_by: actor_id.to_string(),
            created_at: Utc::now(),
        };

        let ledger = self.db.movements();
        let movement = retry_transient(
            "append",
            self.policy.max_retries,
            self.policy.initial_backoff,
            self.policy.max_backoff,
            || {
                let ledger = ledger.clone();
                let new = new.clone();
                async move { ledger.append(new).await }
            },
        )
        .await
        .map_err(map_db)?;

        // Balance answered from a fresh replay of the ledger, not an
        // incremental update of anything.
        let movements = self
            .db
            .movements()
            .list_by_session(session_id)
            .await
            .map_err(map_db)?;
        let balance = balance::compute_balance(&movements);

        info!(
            session_id,
            movement_id = %movement.id,
            kind = ?kind,
            amount = amount_cents,
            balance = balance.cents(),
            "Movement recorded"
        );

        Ok(MovementResponse {
            movement: movement.into(),
            balance_cents: balance.cents(),
            balance: balance.to_decimal_string(),
        })
    }

    // =========================================================================
    // Close
    // =========================================================================

    /// Closes a session against a physically counted amount.
    ///
    /// Computes the expected balance from the full ledger, classifies the
    /// difference, appends the `closing` movement and freezes the session,
    /// all in one transaction. This is the only way a session leaves
    /// `Open`. A discrepancy is reported in the summary, never corrected.
    pub async fn close(
        &self,
        session_id: &str,
        counted_balance_cents: i64,
        notes: Option<&str>,
        actor_id: &str,
    ) -> EngineResult<CloseResponse> {
        debug!(session_id, counted = counted_balance_cents, "close");

        validate_counted_balance(counted_balance_cents)?;
        validate_notes(notes, self.policy.max_notes_len)?;

        let _guard = self.session_locks.acquire(session_id).await;

        let session = self.load_session(session_id).await?;
        if !session.is_open() {
            return Err(EngineError::NotOpen(session_id.to_string()));
        }

        let movements = self
            .db
            .movements()
            .list_by_session(session_id)
            .await
            .map_err(map_db)?;

        let expected = balance::compute_balance(&movements);
        let counted = Money::from_cents(counted_balance_cents);
        let summary = reconcile(expected, counted, self.policy.tolerance_cents);

        let now = Utc::now();
        let closing = Movement {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            kind: MovementKind::Closing,
            amount_cents: counted_balance_cents,
            reason: None,
            sub_method: None,
            created_by: actor_id.to_string(),
            created_at: now,
            sequence: movements.iter().map(|m| m.sequence).max().unwrap_or(0) + 1,
        };

        // Close notes are appended; the opening note stays on the record.
        let merged_notes = merge_notes(session.notes.as_deref(), notes);

        let sessions = self.db.sessions();
        retry_transient(
            "close",
            self.policy.max_retries,
            self.policy.initial_backoff,
            self.policy.max_backoff,
            || {
                let sessions = sessions.clone();
                let merged_notes = merged_notes.clone();
                let closing = &closing;
                async move {
                    sessions
                        .close(
                            session_id,
                            expected.cents(),
                            counted_balance_cents,
                            merged_notes.as_deref(),
                            now,
                            closing,
                        )
                        .await
                }
            },
        )
        .await
        .map_err(|e| match e {
            // The WHERE status = 'open' guard found nothing: closed under us.
            DbError::NotFound { .. } => EngineError::NotOpen(session_id.to_string()),
            other => map_db(other),
        })?;

        match summary.classification {
            Classification::Balanced => info!(
                session_id,
                expected = expected.cents(),
                counted = counted_balance_cents,
                "Session closed balanced"
            ),
            _ => warn!(
                session_id,
                expected = expected.cents(),
                counted = counted_balance_cents,
                difference = summary.difference_cents,
                classification = ?summary.classification,
                "Session closed with discrepancy"
            ),
        }

        // Answer with the frozen row as persisted.
        let closed = self.load_session(session_id).await?;

        Ok(CloseResponse {
            session: SessionDto::from(closed),
            summary: summary.into(),
        })
    }

    // =========================================================================
    // Report
    // =========================================================================

    /// Generates the full session report. Read-only; safe to call
    /// repeatedly and concurrently with writes on other sessions.
    pub async fn report(&self, session_id: &str) -> EngineResult<SessionReport> {
        ReportGenerator::new(self.db.clone(), self.policy.tolerance_cents)
            .generate(session_id)
            .await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn load_session(&self, session_id: &str) -> EngineResult<RegisterSession> {
        self.db
            .sessions()
            .get_by_id(session_id)
            .await
            .map_err(map_db)?
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))
    }
}

/// Generic DbError → EngineError mapping for paths with no more specific
/// context.
fn map_db(err: DbError) -> EngineError {
    EngineError::from(err)
}

/// Appends close notes to the existing session notes.
fn merge_notes(existing: Option<&str>, added: Option<&str>) -> Option<String> {
    let added = added.map(str::trim).filter(|s| !s.is_empty());
    match (existing, added) {
        (Some(a), Some(b)) => Some(format!("{a}\n{b}")),
        (Some(a), None) => Some(a.to_string()),
        (None, Some(b)) => Some(b.to_string()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_notes() {
        assert_eq!(merge_notes(None, None), None);
        assert_eq!(merge_notes(Some("open"), None), Some("open".to_string()));
        assert_eq!(merge_notes(None, Some("close")), Some("close".to_string()));
        assert_eq!(
            merge_notes(Some("open"), Some("close")),
            Some("open\nclose".to_string())
        );
        assert_eq!(merge_notes(Some("open"), Some("  ")), Some("open".to_string()));
    }
}
