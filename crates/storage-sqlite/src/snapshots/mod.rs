//! SQLite storage implementation for market data snapshots.

mod model;
mod repository;

pub use model::MarketSnapshotDB;
pub use repository::SnapshotRepository;

// Re-export trait from core for convenience
pub use stockbrief_core::snapshots::SnapshotRepositoryTrait;
