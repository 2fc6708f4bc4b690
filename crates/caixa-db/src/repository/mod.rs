//! # Repository Module
//!
//! Database repository implementations for the Caixa till engine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Engine Operation                                                      │
//! │       │                                                                 │
//! │       │  db.sessions().find_open_by_terminal("term-1")                 │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  SessionRepository                                                     │
//! │  ├── insert_open(&self, session, opening_movement)                     │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── close(&self, ...)                                                 │
//! │  └── snapshot(&self, id)                                               │
//! │       │                                                                 │
//! │       │  SQL (single transaction per mutation)                          │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  The composite operations (open, close) are transactional here, not    │
//! │  in the engine: a reader must never observe a session row without its  │
//! │  opening movement, or a closed session without its closing movement.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`terminal::TerminalRepository`] - Terminal reference data
//! - [`session::SessionRepository`] - Session lifecycle rows
//! - [`movement::MovementRepository`] - The append-only movement ledger

pub mod movement;
pub mod session;
pub mod terminal;
