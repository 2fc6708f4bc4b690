//! # Engine Policy
//!
//! Tunable business constants, with defaults matching store practice.
//!
//! These are policy, not hard-coded rules: a deployment adjusts them at
//! engine construction, the engine never reads them from ambient state.

use std::time::Duration;

use caixa_core::{DEFAULT_SANGRIA_REASON_MIN_LEN, DEFAULT_TOLERANCE_CENTS, MAX_NOTES_LEN};

/// Tunable engine policy.
///
/// ## Example
/// ```rust
/// use caixa_engine::EnginePolicy;
///
/// let policy = EnginePolicy::default()
///     .tolerance_cents(1)          // absorb one-cent counting slips
///     .sangria_reason_min_len(5);  // stricter withdrawal justifications
/// assert_eq!(policy.tolerance_cents, 1);
/// ```
#[derive(Debug, Clone)]
pub struct EnginePolicy {
    /// Minimum length (chars, trimmed) of a sangria reason.
    /// Default: 3. Suprimento reasons stay optional regardless.
    pub sangria_reason_min_len: usize,

    /// Reconciliation tolerance in minor units.
    /// Default: 0 (all engine arithmetic is integer; nothing to absorb).
    pub tolerance_cents: i64,

    /// Maximum length of free-form notes.
    pub max_notes_len: usize,

    /// Attempts per operation for retryable storage failures (SQLITE_BUSY).
    /// Default: 3. Non-retryable errors are never repeated.
    pub max_retries: u32,

    /// Initial backoff delay between retries.
    pub initial_backoff: Duration,

    /// Cap on the backoff delay.
    pub max_backoff: Duration,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        EnginePolicy {
            sangria_reason_min_len: DEFAULT_SANGRIA_REASON_MIN_LEN,
            tolerance_cents: DEFAULT_TOLERANCE_CENTS,
            max_notes_len: MAX_NOTES_LEN,
            max_retries: 3,
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_secs(1),
        }
    }
}

impl EnginePolicy {
    /// Sets the sangria reason minimum length.
    pub fn sangria_reason_min_len(mut self, min: usize) -> Self {
        self.sangria_reason_min_len = min;
        self
    }

    /// Sets the reconciliation tolerance in minor units.
    pub fn tolerance_cents(mut self, tolerance: i64) -> Self {
        self.tolerance_cents = tolerance;
        self
    }

    /// Sets the retry attempt bound for transient storage failures.
    pub fn max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = EnginePolicy::default();
        assert_eq!(policy.sangria_reason_min_len, 3);
        assert_eq!(policy.tolerance_cents, 0);
        assert_eq!(policy.max_retries, 3);
    }

    #[test]
    fn test_builder() {
        let policy = EnginePolicy::default()
            .tolerance_cents(1)
            .sangria_reason_min_len(5)
            .max_retries(5);
        assert_eq!(policy.tolerance_cents, 1);
        assert_eq!(policy.sangria_reason_min_len, 5);
        assert_eq!(policy.max_retries, 5);
    }
}
