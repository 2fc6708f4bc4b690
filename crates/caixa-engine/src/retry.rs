//! # Bounded Retry
//!
//! Retries transient storage failures with exponential backoff.
//!
//! ## Retry Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  attempt 1 ── Busy ──► sleep ~50ms                                      │
//! │  attempt 2 ── Busy ──► sleep ~100ms                                     │
//! │  attempt 3 ── Busy ──► surface PersistenceError to the caller           │
//! │                                                                         │
//! │  ONLY DbError::Busy / PoolExhausted are retried: the whole operation    │
//! │  is one transaction, so re-running it is safe and idempotent at the    │
//! │  operation boundary. Every other error returns on the first attempt.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use tracing::warn;

use caixa_db::{DbError, DbResult};

/// Runs `op` up to `max_attempts` times, sleeping with exponential backoff
/// between retryable failures.
///
/// `op` must be restartable from scratch: each attempt builds a fresh
/// future, and a failed attempt has rolled back its transaction.
pub(crate) async fn retry_transient<T, F, Fut>(
    op_name: &str,
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    mut op: F,
) -> DbResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    let mut backoff = ExponentialBackoff {
        initial_interval: initial_backoff,
        max_interval: max_backoff,
        max_elapsed_time: None,
        ..ExponentialBackoff::default()
    };
    let mut attempt = 1u32;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                let delay = backoff.next_backoff().unwrap_or(max_backoff);
                warn!(
                    op = op_name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient storage failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn busy() -> DbError {
        DbError::Busy("database is locked".to_string())
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result: DbResult<u32> = retry_transient(
            "test",
            3,
            Duration::from_millis(1),
            Duration::from_millis(2),
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(busy())
                    } else {
                        Ok(n)
                    }
                }
            },
        )
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_surfaces_last_error() {
        let calls = AtomicU32::new(0);
        let result: DbResult<()> = retry_transient(
            "test",
            3,
            Duration::from_millis(1),
            Duration::from_millis(2),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(busy()) }
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), DbError::Busy(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_errors_fail_fast() {
        let calls = AtomicU32::new(0);
        let result: DbResult<()> = retry_transient(
            "test",
            3,
            Duration::from_millis(1),
            Duration::from_millis(2),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(DbError::not_found("Session", "s-1")) }
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), DbError::NotFound { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
