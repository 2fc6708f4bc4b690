//! # caixa-core: Pure Business Logic for the Caixa Till Engine
//!
//! This crate is the **heart** of the till engine. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Caixa Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Callers (till UI, checkout flow)               │   │
//! │  │    open ──► suprimento / sangria / sale_cash ──► close ──► report│  │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  caixa-engine (state machine)                   │   │
//! │  │    preconditions, locking, transactions, reports                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ caixa-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  balance  │  │ reconcile │  │   │
//! │  │   │  Session  │  │   Money   │  │  replay   │  │ classify  │  │   │
//! │  │   │  Movement │  │  cents    │  │  totals   │  │ summary   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    caixa-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Terminal, RegisterSession, Movement, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`balance`] - Ledger replay: balance identity and category totals
//! - [`reconcile`] - Counted-vs-expected classification
//! - [`error`] - Domain error types
//! - [`validation`] - Amount and reason-policy validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use caixa_core::money::Money;
//! use caixa_core::reconcile::{reconcile, Classification};
//!
//! let expected = Money::from_cents(10000);
//! let counted = Money::parse_decimal("99.50").unwrap();
//!
//! let summary = reconcile(expected, counted, 0);
//! assert_eq!(summary.difference_cents, -50);
//! assert_eq!(summary.classification, Classification::Shortage);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod balance;
pub mod error;
pub mod money;
pub mod reconcile;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use caixa_core::Money` instead of
// `use caixa_core::money::Money`

pub use balance::{compute_balance, compute_by_category, CategoryTotal, CategoryTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use reconcile::{reconcile, Classification, ReconciliationSummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default minimum length (in characters, after trimming) of a sangria
/// reason.
///
/// ## Why a constant?
/// Cash leaving the till always needs a justification on the audit trail;
/// top-ups don't. The minimum is a policy default the engine exposes as a
/// tunable, not a hard-coded rule.
pub const DEFAULT_SANGRIA_REASON_MIN_LEN: usize = 3;

/// Default reconciliation tolerance in minor units.
///
/// ## Why zero?
/// Every computation in the engine is integer arithmetic, so there is no
/// rounding residue to absorb. Deployments that want a one-cent grace for
/// counting slips raise this through the engine policy.
pub const DEFAULT_TOLERANCE_CENTS: i64 = 0;

/// Maximum length of free-form notes on a session.
pub const MAX_NOTES_LEN: usize = 500;
