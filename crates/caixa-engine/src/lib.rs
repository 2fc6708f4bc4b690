//! # caixa-engine: Till Session Engine
//!
//! The orchestration layer of the Caixa workspace and its only public
//! operation surface: open a register with a starting float, record cash
//! movements, close against a counted amount, produce the reconciliation
//! report.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Caixa Engine                                     │
//! │                                                                         │
//! │  Caller (till UI / checkout flow), with an authenticated actor id      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 caixa-engine (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  engine   │  │   lock    │  │   retry   │  │  report   │  │   │
//! │  │   │ TillEngine│  │ KeyedLock │  │  backoff  │  │ generator │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐                                 │   │
//! │  │   │  policy   │  │ dto/error │   (client contract)             │   │
//! │  │   └───────────┘  └───────────┘                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │ caixa-core (pure math)        │ caixa-db (SQLite)              │
//! │       ▼                               ▼                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - **One open session per terminal**, enforced by a keyed lock plus the
//!   database's partial unique index; under N concurrent opens, exactly
//!   one wins.
//! - **Single-writer sessions**: movements against one session apply one at
//!   a time, so the sangria balance check always sees the current ledger.
//! - **Atomicity**: every mutation is one transaction; a validation failure
//!   persists nothing; close flips status and appends its `closing`
//!   movement together.
//! - **Immutability**: a closed session and its movements never change.
//! - **No silent fixes**: a discrepancy at close is classified and
//!   reported, never absorbed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use caixa_db::{Database, DbConfig};
//! use caixa_engine::TillEngine;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DbConfig::new("./caixa.db")).await?;
//! let engine = TillEngine::new(db);
//!
//! let session = engine.open("term-1", "op-7", 10_000, None).await?;
//! engine.suprimento(&session.id, 5_000, Some("morning change"), "op-7").await?;
//! engine.sangria(&session.id, 8_000, Some("bank deposit"), "op-7").await?;
//! let closed = engine.close(&session.id, 6_950, None, "op-7").await?;
//! println!("difference: {}", closed.summary.difference);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dto;
pub mod engine;
pub mod error;
pub mod lock;
pub mod policy;
pub mod report;

mod retry;

// =============================================================================
// Re-exports
// =============================================================================

pub use dto::{
    CloseResponse, MovementDto, MovementResponse, ReconciliationDto, SessionDto, SessionReport,
    StatusResponse,
};
pub use engine::TillEngine;
pub use error::{EngineError, EngineResult, ErrorCode, ErrorResponse};
pub use lock::KeyedLock;
pub use policy::EnginePolicy;
pub use report::ReportGenerator;
