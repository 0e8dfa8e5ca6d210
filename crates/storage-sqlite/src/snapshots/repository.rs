use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::model::MarketSnapshotDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::market_snapshots;
use stockbrief_core::errors::Result;
use stockbrief_core::snapshots::{MarketSnapshot, SnapshotKind, SnapshotRepositoryTrait};

pub struct SnapshotRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SnapshotRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SnapshotRepository { pool, writer }
    }
}

#[async_trait]
impl SnapshotRepositoryTrait for SnapshotRepository {
    fn get_latest(&self, symbol: &str, kind: SnapshotKind) -> Result<Option<MarketSnapshot>> {
        let mut conn = get_connection(&self.pool)?;
        let row = market_snapshots::table
            .filter(market_snapshots::symbol.eq(symbol))
            .filter(market_snapshots::kind.eq(kind.as_str()))
            .select(MarketSnapshotDB::as_select())
            .first::<MarketSnapshotDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        row.map(MarketSnapshot::try_from).transpose()
    }

    async fn upsert_snapshot(&self, snapshot: MarketSnapshot) -> Result<()> {
        let row = MarketSnapshotDB::try_from(snapshot)?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_into(market_snapshots::table)
                    .values(&row)
                    .on_conflict((market_snapshots::symbol, market_snapshots::kind))
                    .do_update()
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn delete_snapshots_for_symbol(&self, symbol: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let deleted = diesel::delete(
                    market_snapshots::table.filter(market_snapshots::symbol.eq(&symbol)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(deleted)
            })
            .await
    }

    async fn delete_snapshots_before(&self, cutoff: NaiveDateTime) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let deleted = diesel::delete(
                    market_snapshots::table.filter(market_snapshots::fetched_at.lt(cutoff)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(deleted)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use chrono::{Duration, Utc};
    use serde_json::json;
    use tempfile::tempdir;

    async fn create_test_repository() -> (SnapshotRepository, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let pool = create_pool(&db_path.to_string_lossy()).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());
        (SnapshotRepository::new(pool, writer), temp_dir)
    }

    fn snapshot(symbol: &str, kind: SnapshotKind, price: f64, age_days: i64) -> MarketSnapshot {
        MarketSnapshot {
            symbol: symbol.to_string(),
            kind,
            payload: json!({ "symbol": symbol, "price": price }),
            fetched_at: Utc::now().naive_utc() - Duration::days(age_days),
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_previous_snapshot() {
        let (repo, _dir) = create_test_repository().await;

        repo.upsert_snapshot(snapshot("AAPL", SnapshotKind::Quote, 150.0, 1))
            .await
            .unwrap();
        let newer = snapshot("AAPL", SnapshotKind::Quote, 155.0, 0);
        repo.upsert_snapshot(newer.clone()).await.unwrap();

        let loaded = repo.get_latest("AAPL", SnapshotKind::Quote).unwrap().unwrap();
        assert_eq!(loaded.payload, newer.payload);
        assert_eq!(loaded.fetched_at, newer.fetched_at);
        assert!(repo.get_latest("AAPL", SnapshotKind::History).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_snapshot_needs_no_stock_row() {
        let (repo, _dir) = create_test_repository().await;

        repo.upsert_snapshot(snapshot("NEW", SnapshotKind::History, 1.0, 0))
            .await
            .unwrap();

        assert!(repo.get_latest("NEW", SnapshotKind::History).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_by_symbol_and_age() {
        let (repo, _dir) = create_test_repository().await;

        repo.upsert_snapshot(snapshot("AAPL", SnapshotKind::Quote, 150.0, 0))
            .await
            .unwrap();
        repo.upsert_snapshot(snapshot("AAPL", SnapshotKind::History, 150.0, 0))
            .await
            .unwrap();
        repo.upsert_snapshot(snapshot("MSFT", SnapshotKind::Quote, 400.0, 45))
            .await
            .unwrap();

        let cutoff = Utc::now().naive_utc() - Duration::days(30);
        assert_eq!(repo.delete_snapshots_before(cutoff).await.unwrap(), 1);
        assert!(repo.get_latest("MSFT", SnapshotKind::Quote).unwrap().is_none());

        assert_eq!(
            repo.delete_snapshots_for_symbol("AAPL".to_string())
                .await
                .unwrap(),
            2
        );
        assert!(repo.get_latest("AAPL", SnapshotKind::Quote).unwrap().is_none());
    }
}
