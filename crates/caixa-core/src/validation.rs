//! # Validation Module
//!
//! Input validation for till operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (UI / checkout collaborator)                          │
//! │  ├── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (engine entry)                                   │
//! │  ├── Amount positivity / non-negativity                                │
//! │  └── Reason policy (sangria mandatory, suprimento optional)            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (amount_cents >= 0)                                         │
//! │  └── Partial unique index on open sessions                             │
//! │                                                                         │
//! │  Defense in depth: a rejected input persists NOTHING.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Amount Validators
// =============================================================================

/// Validates a movement amount (sangria, suprimento, cash sale): strictly
/// positive. Zero-amount movements carry no information and are rejected.
pub fn validate_movement_amount(amount_cents: i64) -> ValidationResult<()> {
    if amount_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

/// Validates an opening float. Zero is a legitimate float (an empty drawer).
pub fn validate_opening_balance(amount_cents: i64) -> ValidationResult<()> {
    if amount_cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "opening_balance".to_string(),
        });
    }
    Ok(())
}

/// Validates the physically counted amount at close. An emptied drawer
/// counts to zero, so zero is allowed; negative cash does not exist.
pub fn validate_counted_balance(amount_cents: i64) -> ValidationResult<()> {
    if amount_cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "counted_balance".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Reason Policy
// =============================================================================

/// Validates a sangria reason against the configured minimum length.
///
/// The asymmetry with suprimento (whose reason is optional) is deliberate
/// policy: cash leaving the till always needs a justification on the audit
/// trail. Returns the trimmed reason.
///
/// ## Example
/// ```rust
/// use caixa_core::validation::validate_sangria_reason;
///
/// assert_eq!(
///     validate_sangria_reason(Some("  bank deposit "), 3).unwrap(),
///     "bank deposit"
/// );
/// assert!(validate_sangria_reason(Some("ok"), 3).is_err());
/// assert!(validate_sangria_reason(None, 3).is_err());
/// ```
pub fn validate_sangria_reason(
    reason: Option<&str>,
    min_len: usize,
) -> ValidationResult<String> {
    let reason = reason.map(str::trim).unwrap_or("");

    if reason.chars().count() < min_len {
        return Err(ValidationError::ReasonTooShort { min: min_len });
    }

    Ok(reason.to_string())
}

/// Normalizes an optional reason (suprimento, notes-style fields): trims,
/// and maps whitespace-only input to `None`.
pub fn normalize_optional_reason(reason: Option<&str>) -> Option<String> {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
}

/// Validates free-form notes length.
pub fn validate_notes(notes: Option<&str>, max_len: usize) -> ValidationResult<()> {
    if let Some(notes) = notes {
        if notes.chars().count() > max_len {
            return Err(ValidationError::TooLong {
                field: "notes".to_string(),
                max: max_len,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_amount_must_be_positive() {
        assert!(validate_movement_amount(1).is_ok());
        assert!(validate_movement_amount(0).is_err());
        assert!(validate_movement_amount(-100).is_err());
    }

    #[test]
    fn test_opening_and_counted_allow_zero() {
        assert!(validate_opening_balance(0).is_ok());
        assert!(validate_counted_balance(0).is_ok());
        assert!(validate_opening_balance(-1).is_err());
        assert!(validate_counted_balance(-1).is_err());
    }

    #[test]
    fn test_sangria_reason_policy() {
        assert_eq!(
            validate_sangria_reason(Some("bank deposit"), 3).unwrap(),
            "bank deposit"
        );
        // trimming happens before the length check
        assert!(validate_sangria_reason(Some("  ab  "), 3).is_err());
        assert!(validate_sangria_reason(Some(""), 3).is_err());
        assert!(validate_sangria_reason(None, 3).is_err());
        // the minimum is policy, not hard-coded
        assert!(validate_sangria_reason(Some("ab"), 2).is_ok());
    }

    #[test]
    fn test_normalize_optional_reason() {
        assert_eq!(
            normalize_optional_reason(Some(" change for the morning ")),
            Some("change for the morning".to_string())
        );
        assert_eq!(normalize_optional_reason(Some("   ")), None);
        assert_eq!(normalize_optional_reason(None), None);
    }

    #[test]
    fn test_notes_length() {
        assert!(validate_notes(Some("short"), 500).is_ok());
        assert!(validate_notes(None, 500).is_ok());
        let long = "x".repeat(501);
        assert!(validate_notes(Some(&long), 500).is_err());
    }
}
