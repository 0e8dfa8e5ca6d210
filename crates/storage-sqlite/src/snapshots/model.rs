//! Database model for market data snapshots.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use stockbrief_core::errors::{Error, Result};
use stockbrief_core::snapshots::{MarketSnapshot, SnapshotKind};

/// Database model for market data snapshots. The payload is stored as JSON text.
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::market_snapshots)]
#[diesel(primary_key(symbol, kind))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketSnapshotDB {
    pub symbol: String,
    pub kind: String,
    pub payload: String,
    pub fetched_at: NaiveDateTime,
}

impl TryFrom<MarketSnapshot> for MarketSnapshotDB {
    type Error = Error;

    fn try_from(snapshot: MarketSnapshot) -> Result<Self> {
        Ok(Self {
            symbol: snapshot.symbol,
            kind: snapshot.kind.as_str().to_string(),
            payload: serde_json::to_string(&snapshot.payload)?,
            fetched_at: snapshot.fetched_at,
        })
    }
}

impl TryFrom<MarketSnapshotDB> for MarketSnapshot {
    type Error = Error;

    fn try_from(db: MarketSnapshotDB) -> Result<Self> {
        Ok(Self {
            kind: db.kind.parse::<SnapshotKind>()?,
            payload: serde_json::from_str(&db.payload)?,
            symbol: db.symbol,
            fetched_at: db.fetched_at,
        })
    }
}
