//! # Terminal Repository
//!
//! Reference-data access for terminals. The engine only reads this table;
//! rows come from the seed binary or an installer.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use caixa_core::Terminal;

/// Repository for terminal reference data.
#[derive(Debug, Clone)]
pub struct TerminalRepository {
    pool: SqlitePool,
}

impl TerminalRepository {
    /// Creates a new TerminalRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TerminalRepository { pool }
    }

    /// Registers a terminal. Used by seeding/installation, not the engine.
    pub async fn insert(&self, terminal: &Terminal) -> DbResult<()> {
        debug!(id = %terminal.id, name = %terminal.name, "Inserting terminal");

        sqlx::query(
            r#"
            INSERT INTO terminals (id, name, created_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(&terminal.id)
        .bind(&terminal.name)
        .bind(terminal.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a terminal by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Terminal>> {
        let terminal = sqlx::query_as::<_, Terminal>(
            "SELECT id, name, created_at FROM terminals WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(terminal)
    }

    /// Lists all terminals, by display name.
    pub async fn list(&self) -> DbResult<Vec<Terminal>> {
        let terminals = sqlx::query_as::<_, Terminal>(
            "SELECT id, name, created_at FROM terminals ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(terminals)
    }
}
