//! Core services running against a real SQLite file.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tempfile::tempdir;

use stockbrief_core::snapshots::{SnapshotService, SnapshotServiceTrait};
use stockbrief_core::stocks::{NewStock, StockService, StockServiceTrait};
use stockbrief_market_data::{CanonicalHistory, CanonicalQuote, HistoryRecord};
use stockbrief_storage_sqlite::{open, SnapshotRepository, StockRepository};

fn quote() -> CanonicalQuote {
    CanonicalQuote {
        name: Some("Apple Inc.".to_string()),
        exchange: Some("NASDAQ".to_string()),
        currency: Some("USD".to_string()),
        price: Some(189.5),
        year_low: Some(140.0),
        year_high: Some(199.6),
        ..CanonicalQuote::new("AAPL")
    }
}

fn history() -> CanonicalHistory {
    let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let records = (0..5)
        .map(|i| HistoryRecord {
            date: start + Duration::days(i),
            open: Some(180.0),
            high: Some(190.0),
            low: Some(179.0),
            close: Some(185.0 + i as f64),
            volume: Some(5_000_000.0),
            change_percent: None,
        })
        .collect();
    CanonicalHistory::new("AAPL", records, 5)
}

#[tokio::test]
async fn test_snapshots_round_trip_through_sqlite() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("data").join("stockbrief.db");
    let (pool, writer) = open(&db_path.to_string_lossy()).unwrap();
    let service = SnapshotService::new(Arc::new(SnapshotRepository::new(pool, writer)));

    assert!(service.load_latest("AAPL").unwrap().is_empty());

    assert!(service.store_quote(&quote()).await);
    assert!(service.store_history(&history()).await);

    let stored = service.load_latest("AAPL").unwrap();
    assert_eq!(stored.quote, Some(quote()));
    assert_eq!(stored.history, Some(history()));
    assert!(stored.quote_fetched_at.is_some());

    assert_eq!(service.delete_for_symbol("AAPL").await.unwrap(), 2);
    assert!(service.load_latest("AAPL").unwrap().is_empty());
}

#[tokio::test]
async fn test_stock_metadata_from_quote_then_partial_update() {
    let dir = tempdir().unwrap();
    let (pool, writer) = open(&dir.path().join("sb.db").to_string_lossy()).unwrap();
    let repo = Arc::new(StockRepository::new(pool, writer));
    let service = StockService::new(repo);

    assert!(
        service
            .upsert_stock(NewStock::from_quote("AAPL", Some(&quote())))
            .await
    );
    assert!(service.upsert_stock(NewStock::from_quote("AAPL", None)).await);
    assert!(!service.upsert_stock(NewStock::from_quote("  ", None)).await);

    let stock = service.get_stock("AAPL").unwrap().unwrap();
    assert_eq!(stock.name, "Apple Inc.");
    assert_eq!(stock.exchange.as_deref(), Some("NASDAQ"));
    assert_eq!(service.get_stocks().unwrap().len(), 1);
}
