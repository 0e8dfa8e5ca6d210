use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::model::StockDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::stocks;
use stockbrief_core::errors::Result;
use stockbrief_core::stocks::{NewStock, Stock, StockRepositoryTrait};

pub struct StockRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl StockRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        StockRepository { pool, writer }
    }
}

#[async_trait]
impl StockRepositoryTrait for StockRepository {
    fn get_stock(&self, symbol: &str) -> Result<Option<Stock>> {
        let mut conn = get_connection(&self.pool)?;
        stocks::table
            .find(symbol)
            .first::<StockDB>(&mut conn)
            .optional()
            .map(|row| row.map(Stock::from))
            .into_core()
    }

    fn list_stocks(&self) -> Result<Vec<Stock>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = stocks::table
            .order(stocks::symbol.asc())
            .load::<StockDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Stock::from).collect())
    }

    async fn upsert_stock(&self, stock: NewStock) -> Result<Stock> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Stock> {
                let now = Utc::now().naive_utc();
                let existing = stocks::table
                    .find(&stock.symbol)
                    .first::<StockDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?;

                let row = match existing {
                    Some(current) => {
                        let merged = current.coalesce(stock, now);
                        diesel::update(stocks::table.find(&merged.symbol))
                            .set(&merged)
                            .execute(conn)
                            .map_err(StorageError::from)?;
                        merged
                    }
                    None => {
                        let fresh = StockDB::from_new(stock, now);
                        diesel::insert_into(stocks::table)
                            .values(&fresh)
                            .execute(conn)
                            .map_err(StorageError::from)?;
                        fresh
                    }
                };

                Ok(Stock::from(row))
            })
            .await
    }
}
