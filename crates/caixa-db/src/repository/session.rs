//! # Session Repository
//!
//! Database operations for register sessions.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Session Lifecycle                                 │
//! │                                                                         │
//! │  1. OPEN (one transaction)                                             │
//! │     ├── insert_open() → session row { status: open }                   │
//! │     └──               → `opening` movement (sequence 1)                │
//! │                                                                         │
//! │  2. ACCUMULATE                                                         │
//! │     └── MovementRepository::append() → sangria/suprimento/sale_cash    │
//! │                                                                         │
//! │  3. CLOSE (one transaction, the only exit from `open`)                 │
//! │     ├── close() → status = closed, balances frozen, closed_at set      │
//! │     └──        → `closing` movement                                    │
//! │                                                                         │
//! │  Sessions are NEVER deleted. The partial unique index on               │
//! │  (terminal_id) WHERE status = 'open' makes a second concurrent open    │
//! │  lose with a unique violation.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::movement::insert_movement;
use caixa_core::{Movement, RegisterSession};

/// Repository for session database operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Inserts a freshly opened session together with its `opening`
    /// movement, atomically.
    ///
    /// A concurrent open on the same terminal hits the partial unique index
    /// and surfaces as [`DbError::UniqueViolation`].
    pub async fn insert_open(
        &self,
        session: &RegisterSession,
        opening: &Movement,
    ) -> DbResult<()> {
        debug!(
            id = %session.id,
            terminal_id = %session.terminal_id,
            opening_balance = %session.opening_balance_cents,
            "Inserting open session"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO register_sessions (
                id, terminal_id, operator_id, status,
                opening_balance_cents, closing_balance_cents, expected_balance_cents,
                notes, opened_at, closed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&session.id)
        .bind(&session.terminal_id)
        .bind(&session.operator_id)
        .bind(session.status)
        .bind(session.opening_balance_cents)
        .bind(session.closing_balance_cents)
        .bind(session.expected_balance_cents)
        .bind(&session.notes)
        .bind(session.opened_at)
        .bind(session.closed_at)
        .execute(&mut *tx)
        .await?;

        insert_movement(&mut *tx, opening).await?;

        tx.commit().await?;

        Ok(())
    }

    /// Gets a session by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<RegisterSession>> {
        let session = sqlx::query_as::<_, RegisterSession>(
            r#"
            SELECT
                id, terminal_id, operator_id, status,
                opening_balance_cents, closing_balance_cents, expected_balance_cents,
                notes, opened_at, closed_at
            FROM register_sessions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Finds the open session for a terminal, if any.
    ///
    /// The partial unique index guarantees at most one row matches.
    pub async fn find_open_by_terminal(
        &self,
        terminal_id: &str,
    ) -> DbResult<Option<RegisterSession>> {
        let session = sqlx::query_as::<_, RegisterSession>(
            r#"
            SELECT
                id, terminal_id, operator_id, status,
                opening_balance_cents, closing_balance_cents, expected_balance_cents,
                notes, opened_at, closed_at
            FROM register_sessions
            WHERE terminal_id = ?1 AND status = 'open'
            "#,
        )
        .bind(terminal_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Closes a session: freezes balances, flips status, stamps `closed_at`
    /// and appends the `closing` movement, all in one transaction.
    ///
    /// The `WHERE status = 'open'` guard makes this the single exit from the
    /// open state: a session that already closed is reported, not
    /// re-closed.
    #[allow(clippy::too_many_arguments)]
    pub async fn close(
        &self,
        session_id: &str,
        expected_balance_cents: i64,
        closing_balance_cents: i64,
        notes: Option<&str>,
        closed_at: DateTime<Utc>,
        closing: &Movement,
    ) -> DbResult<()> {
        debug!(
            id = %session_id,
            expected = %expected_balance_cents,
            counted = %closing_balance_cents,
            "Closing session"
        );

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE register_sessions SET
                status = 'closed',
                expected_balance_cents = ?2,
                closing_balance_cents = ?3,
                notes = ?4,
                closed_at = ?5
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(session_id)
        .bind(expected_balance_cents)
        .bind(closing_balance_cents)
        .bind(notes)
        .bind(closed_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Open session", session_id));
        }

        insert_movement(&mut *tx, closing).await?;

        tx.commit().await?;

        Ok(())
    }

    /// Reads a session and its full ordered movement list in one snapshot.
    ///
    /// Both queries run inside a single read transaction, so a writer
    /// committing between them cannot tear the result. Used by reporting.
    pub async fn snapshot(
        &self,
        session_id: &str,
    ) -> DbResult<Option<(RegisterSession, Vec<Movement>)>> {
        let mut tx = self.pool.begin().await?;

        let session = sqlx::query_as::<_, RegisterSession>(
            r#"
            SELECT
                id, terminal_id, operator_id, status,
                opening_balance_cents, closing_balance_cents, expected_balance_cents,
                notes, opened_at, closed_at
            FROM register_sessions
            WHERE id = ?1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(session) = session else {
            tx.commit().await?;
            return Ok(None);
        };

        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT
                id, session_id, kind, amount_cents, reason, sub_method,
                created_by, created_at, sequence
            FROM movements
            WHERE session_id = ?1
            ORDER BY created_at ASC, sequence ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some((session, movements)))
    }
}
