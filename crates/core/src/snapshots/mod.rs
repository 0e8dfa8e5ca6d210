//! Snapshots module - the latest canonical market data stored per symbol.
//!
//! Analysis only ever reads market data back from here, so a failed fetch can
//! still be analyzed against the previous run's snapshot.

mod snapshots_model;
mod snapshots_service;
mod snapshots_traits;

pub use snapshots_model::{MarketSnapshot, SnapshotKind, StoredMarketData};
pub use snapshots_service::SnapshotService;
pub use snapshots_traits::{SnapshotRepositoryTrait, SnapshotServiceTrait};
