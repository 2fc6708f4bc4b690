//! # Engine Error Type
//!
//! What callers of the till engine see when an operation fails.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Failure Classes                                      │
//! │                                                                         │
//! │  Validation   → Validation(..)            rejected, nothing persisted   │
//! │  State        → AlreadyOpen / NotOpen /   precondition violation,       │
//! │                 SessionNotFound /         rejected, nothing persisted   │
//! │                 SessionClosed /                                         │
//! │                 TerminalNotFound                                        │
//! │  Balance      → InsufficientBalance       rejected, carries `available` │
//! │  Concurrency  → Conflict                  a racing writer won; caller   │
//! │                                           may retry the whole call      │
//! │  Persistence  → Persistence               transient storage failure,    │
//! │                                           retried internally first      │
//! │                                                                         │
//! │  No error is silently absorbed. A discrepancy at close is REPORTED     │
//! │  (in the reconciliation summary), never an error and never corrected.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

use caixa_core::{CoreError, ValidationError};
use caixa_db::DbError;

// =============================================================================
// Engine Error
// =============================================================================

/// Errors surfaced by till engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The terminal already has an open session.
    #[error("Terminal {terminal_id} already has an open session ({session_id})")]
    AlreadyOpen {
        terminal_id: String,
        session_id: String,
    },

    /// Close was requested for a session that is not open.
    #[error("Session {0} is not open")]
    NotOpen(String),

    /// No session with this id exists.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// A movement was appended to a closed session.
    #[error("Session {0} is closed; its ledger is immutable")]
    SessionClosed(String),

    /// Open was requested for an unknown terminal.
    #[error("Terminal not found: {0}")]
    TerminalNotFound(String),

    /// A sangria exceeded the current computed balance.
    #[error("Insufficient balance: requested {requested_cents}, available {available_cents}")]
    InsufficientBalance {
        requested_cents: i64,
        available_cents: i64,
    },

    /// Caller input rejected before any state was touched.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Lost a write race; the whole operation is safe to retry.
    #[error("Write conflict: {0}")]
    Conflict(String),

    /// Storage failure that survived the internal retries.
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Error Codes (client contract)
// =============================================================================

/// Machine-readable error codes for programmatic handling.
///
/// ## Usage in a Frontend
/// ```typescript
/// try {
///   await till.sangria({ sessionId, amount, reason });
/// } catch (e) {
///   if (e.code === 'INSUFFICIENT_BALANCE') showAvailable(e.message);
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    AlreadyOpen,
    NotOpen,
    SessionNotFound,
    SessionClosed,
    TerminalNotFound,
    InsufficientBalance,
    ValidationError,
    Conflict,
    PersistenceError,
}

impl EngineError {
    /// The machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::AlreadyOpen { .. } => ErrorCode::AlreadyOpen,
            EngineError::NotOpen(_) => ErrorCode::NotOpen,
            EngineError::SessionNotFound(_) => ErrorCode::SessionNotFound,
            EngineError::SessionClosed(_) => ErrorCode::SessionClosed,
            EngineError::TerminalNotFound(_) => ErrorCode::TerminalNotFound,
            EngineError::InsufficientBalance { .. } => ErrorCode::InsufficientBalance,
            EngineError::Validation(_) => ErrorCode::ValidationError,
            EngineError::Conflict(_) => ErrorCode::Conflict,
            EngineError::Persistence(_) => ErrorCode::PersistenceError,
        }
    }

    /// Whether the caller may safely retry the whole operation.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::Conflict(_) | EngineError::Persistence(_)
        )
    }
}

/// Serialized error shape for the client contract.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ErrorResponse {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

impl From<&EngineError> for ErrorResponse {
    fn from(err: &EngineError) -> Self {
        ErrorResponse {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

/// Converts core business errors to engine errors.
impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientBalance {
                requested_cents,
                available_cents,
            } => EngineError::InsufficientBalance {
                requested_cents,
                available_cents,
            },
            CoreError::Validation(e) => EngineError::Validation(e),
        }
    }
}

/// Converts database errors to engine errors.
///
/// Precondition-specific mappings (unique violation at open → AlreadyOpen)
/// happen at the call sites that know the context; this is the generic
/// fallback.
impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { id, .. } => EngineError::SessionNotFound(id),
            DbError::Busy(msg) => EngineError::Conflict(msg),
            DbError::UniqueViolation { field, .. } => {
                EngineError::Conflict(format!("unique constraint on {field}"))
            }
            other => {
                tracing::error!(error = %other, "Storage failure");
                EngineError::Persistence(other.to_string())
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let err = EngineError::InsufficientBalance {
            requested_cents: 10001,
            available_cents: 10000,
        };
        assert_eq!(err.code(), ErrorCode::InsufficientBalance);
        assert!(!err.is_retryable());

        assert!(EngineError::Conflict("lost race".to_string()).is_retryable());
        assert!(EngineError::Persistence("io".to_string()).is_retryable());
    }

    #[test]
    fn test_error_response_shape() {
        let err = EngineError::SessionNotFound("s-1".to_string());
        let body = ErrorResponse::from(&err);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "SESSION_NOT_FOUND");
        assert_eq!(json["message"], "Session not found: s-1");
    }

    #[test]
    fn test_core_error_conversion() {
        let core = CoreError::InsufficientBalance {
            requested_cents: 5,
            available_cents: 1,
        };
        let engine: EngineError = core.into();
        assert_eq!(engine.code(), ErrorCode::InsufficientBalance);
    }
}
