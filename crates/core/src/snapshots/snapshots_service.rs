use crate::errors::Result;
use crate::snapshots::snapshots_model::{MarketSnapshot, SnapshotKind, StoredMarketData};
use crate::snapshots::snapshots_traits::{SnapshotRepositoryTrait, SnapshotServiceTrait};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use stockbrief_market_data::{CanonicalHistory, CanonicalQuote};

pub struct SnapshotService {
    snapshot_repo: Arc<dyn SnapshotRepositoryTrait>,
}

impl SnapshotService {
    pub fn new(snapshot_repo: Arc<dyn SnapshotRepositoryTrait>) -> Self {
        SnapshotService { snapshot_repo }
    }

    async fn store<T: Serialize>(&self, symbol: &str, kind: SnapshotKind, record: &T) -> bool {
        let payload = match serde_json::to_value(record) {
            Ok(v) => v,
            Err(e) => {
                error!("Failed to encode {} snapshot for {}: {}", kind, symbol, e);
                return false;
            }
        };

        let snapshot = MarketSnapshot {
            symbol: symbol.to_string(),
            kind,
            payload,
            fetched_at: Utc::now().naive_utc(),
        };

        match self.snapshot_repo.upsert_snapshot(snapshot).await {
            Ok(()) => {
                debug!("Stored {} snapshot for {}", kind, symbol);
                true
            }
            Err(e) => {
                error!("Failed to store {} snapshot for {}: {}", kind, symbol, e);
                false
            }
        }
    }

    fn decode<T: DeserializeOwned>(snapshot: MarketSnapshot) -> Option<T> {
        match serde_json::from_value(snapshot.payload) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(
                    "Ignoring undecodable {} snapshot for {}: {}",
                    snapshot.kind, snapshot.symbol, e
                );
                None
            }
        }
    }
}

#[async_trait]
impl SnapshotServiceTrait for SnapshotService {
    async fn store_quote(&self, quote: &CanonicalQuote) -> bool {
        self.store(&quote.symbol, SnapshotKind::Quote, quote).await
    }

    async fn store_history(&self, history: &CanonicalHistory) -> bool {
        self.store(&history.symbol, SnapshotKind::History, history).await
    }

    fn load_latest(&self, symbol: &str) -> Result<StoredMarketData> {
        let mut data = StoredMarketData::default();

        if let Some(snapshot) = self.snapshot_repo.get_latest(symbol, SnapshotKind::Quote)? {
            data.quote_fetched_at = Some(snapshot.fetched_at);
            data.quote = Self::decode::<CanonicalQuote>(snapshot);
        }

        if let Some(snapshot) = self.snapshot_repo.get_latest(symbol, SnapshotKind::History)? {
            data.history_fetched_at = Some(snapshot.fetched_at);
            data.history = Self::decode::<CanonicalHistory>(snapshot).filter(|h| !h.is_empty());
        }

        Ok(data)
    }

    async fn prune_snapshots(&self, older_than_days: i64) -> Result<usize> {
        let cutoff = (Utc::now() - Duration::days(older_than_days)).naive_utc();
        let removed = self.snapshot_repo.delete_snapshots_before(cutoff).await?;
        info!("Pruned {} snapshots older than {} days", removed, older_than_days);
        Ok(removed)
    }

    async fn delete_for_symbol(&self, symbol: &str) -> Result<usize> {
        self.snapshot_repo
            .delete_snapshots_for_symbol(symbol.to_string())
            .await
    }
}
