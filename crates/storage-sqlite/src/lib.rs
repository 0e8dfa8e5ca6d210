//! SQLite storage implementation for StockBrief.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `stockbrief-core` and contains:
//! - Database connection pooling and the single writer actor
//! - Diesel migrations
//! - Repository implementations for stocks, questions, snapshots and answers
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! `core` and `ai` are database-agnostic and work with traits.
//!
//! ```text
//!   core (domain)      ai (analysis)
//!        │                  │
//!        └────────┬─────────┘
//!                 │
//!                 ▼
//!        storage-sqlite (this crate)
//!                 │
//!                 ▼
//!             SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod answers;
pub mod questions;
pub mod snapshots;
pub mod stocks;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, open, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle, DEFAULT_DB_FILE,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export repositories
pub use answers::AnswerRepository;
pub use questions::QuestionRepository;
pub use snapshots::SnapshotRepository;
pub use stocks::StockRepository;

// Re-export from stockbrief-core for convenience
pub use stockbrief_core::errors::{DatabaseError, Error, Result};
