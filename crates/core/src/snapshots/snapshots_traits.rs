use crate::errors::Result;
use crate::snapshots::snapshots_model::{MarketSnapshot, SnapshotKind, StoredMarketData};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use stockbrief_market_data::{CanonicalHistory, CanonicalQuote};

/// Trait for snapshot repository operations
#[async_trait]
pub trait SnapshotRepositoryTrait: Send + Sync {
    fn get_latest(&self, symbol: &str, kind: SnapshotKind) -> Result<Option<MarketSnapshot>>;
    /// Replace the stored snapshot for (symbol, kind).
    async fn upsert_snapshot(&self, snapshot: MarketSnapshot) -> Result<()>;
    async fn delete_snapshots_for_symbol(&self, symbol: String) -> Result<usize>;
    /// Delete snapshots fetched before `cutoff`.
    async fn delete_snapshots_before(&self, cutoff: NaiveDateTime) -> Result<usize>;
}

/// Trait for snapshot service operations
#[async_trait]
pub trait SnapshotServiceTrait: Send + Sync {
    async fn store_quote(&self, quote: &CanonicalQuote) -> bool;
    async fn store_history(&self, history: &CanonicalHistory) -> bool;
    /// Decoded latest snapshots. Undecodable payloads read as absent.
    fn load_latest(&self, symbol: &str) -> Result<StoredMarketData>;
    async fn prune_snapshots(&self, older_than_days: i64) -> Result<usize>;
    async fn delete_for_symbol(&self, symbol: &str) -> Result<usize>;
}
