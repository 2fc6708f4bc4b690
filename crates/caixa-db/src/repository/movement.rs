//! # Movement Repository
//!
//! The append-only movement ledger.
//!
//! ## Append-Only Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  There is no UPDATE and no DELETE in this file.                         │
//! │                                                                         │
//! │  Every monetary event is one INSERT, allocated the next per-session    │
//! │  sequence inside the same transaction. Replaying the rows in           │
//! │  (created_at, sequence) order reproduces the balance exactly.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use caixa_core::{Movement, MovementKind};

/// Input for appending one movement. The repository allocates the id and
/// the per-session sequence.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub session_id: String,
    pub kind: MovementKind,
    pub amount_cents: i64,
    pub reason: Option<String>,
    pub sub_method: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Repository for ledger operations.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Appends one movement, allocating the next sequence in the same
    /// transaction as the insert.
    pub async fn append(&self, new: NewMovement) -> DbResult<Movement> {
        debug!(
            session_id = %new.session_id,
            kind = ?new.kind,
            amount = %new.amount_cents,
            "Appending movement"
        );

        let mut tx = self.pool.begin().await?;

        let sequence = next_sequence(&mut *tx, &new.session_id).await?;

        let movement = Movement {
            id: Uuid::new_v4().to_string(),
            session_id: new.session_id,
            kind: new.kind,
            amount_cents: new.amount_cents,
            reason: new.reason,
            sub_method: new.sub_method,
            created_by: new.created_by,
            created_at: new.created_at,
            sequence,
        };

        insert_movement(&mut *tx, &movement).await?;

        tx.commit().await?;

        Ok(movement)
    }

    /// Gets all movements for a session, ordered for replay:
    /// `(created_at, sequence)` ascending.
    ///
    /// Restartable: each call re-queries the full list.
    pub async fn list_by_session(&self, session_id: &str) -> DbResult<Vec<Movement>> {
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
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}

/// Inserts a movement row on any executor (pool or open transaction).
///
/// Shared with the session repository, whose open/close transactions write
/// the `opening`/`closing` movements atomically with the session row.
pub(crate) async fn insert_movement<'e, E>(executor: E, m: &Movement) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO movements (
            id, session_id, kind, amount_cents, reason, sub_method,
            created_by, created_at, sequence
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&m.id)
    .bind(&m.session_id)
    .bind(m.kind)
    .bind(m.amount_cents)
    .bind(&m.reason)
    .bind(&m.sub_method)
    .bind(&m.created_by)
    .bind(m.created_at)
    .bind(m.sequence)
    .execute(executor)
    .await?;

    Ok(())
}

/// Allocates the next per-session sequence number.
///
/// Must run inside the transaction that inserts the movement; the unique
/// index on (session_id, sequence) catches any allocation race.
pub(crate) async fn next_sequence<'e, E>(executor: E, session_id: &str) -> DbResult<i64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let next: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(sequence), 0) + 1 FROM movements WHERE session_id = ?1",
    )
    .bind(session_id)
    .fetch_one(executor)
    .await?;

    Ok(next)
}
