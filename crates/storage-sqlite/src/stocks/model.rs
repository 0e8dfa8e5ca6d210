//! Database model for stocks.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use stockbrief_core::stocks::{NewStock, Stock};

/// Database model for stocks
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::stocks)]
#[diesel(primary_key(symbol))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct StockDB {
    pub symbol: String,
    pub name: String,
    pub exchange: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub currency: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl StockDB {
    /// Row for a stock seen for the first time. A missing name falls back
    /// to the symbol.
    pub fn from_new(stock: NewStock, now: NaiveDateTime) -> Self {
        Self {
            name: stock.name.unwrap_or_else(|| stock.symbol.clone()),
            symbol: stock.symbol,
            exchange: stock.exchange,
            sector: stock.sector,
            industry: stock.industry,
            country: stock.country,
            currency: stock.currency,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply provided fields over the stored row; absent fields keep their
    /// stored values.
    pub fn coalesce(self, stock: NewStock, now: NaiveDateTime) -> Self {
        Self {
            symbol: self.symbol,
            name: stock.name.unwrap_or(self.name),
            exchange: stock.exchange.or(self.exchange),
            sector: stock.sector.or(self.sector),
            industry: stock.industry.or(self.industry),
            country: stock.country.or(self.country),
            currency: stock.currency.or(self.currency),
            created_at: self.created_at,
            updated_at: now,
        }
    }
}

impl From<StockDB> for Stock {
    fn from(db: StockDB) -> Self {
        Self {
            symbol: db.symbol,
            name: db.name,
            exchange: db.exchange,
            sector: db.sector,
            industry: db.industry,
            country: db.country,
            currency: db.currency,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
