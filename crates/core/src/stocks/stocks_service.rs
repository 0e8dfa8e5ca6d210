use crate::errors::Result;
use crate::stocks::stocks_model::{NewStock, Stock};
use crate::stocks::stocks_traits::{StockRepositoryTrait, StockServiceTrait};
use async_trait::async_trait;
use log::{debug, error};
use std::sync::Arc;

pub struct StockService {
    stock_repo: Arc<dyn StockRepositoryTrait>,
}

impl StockService {
    pub fn new(stock_repo: Arc<dyn StockRepositoryTrait>) -> Self {
        StockService { stock_repo }
    }
}

#[async_trait]
impl StockServiceTrait for StockService {
    fn get_stock(&self, symbol: &str) -> Result<Option<Stock>> {
        self.stock_repo.get_stock(symbol)
    }

    fn get_stocks(&self) -> Result<Vec<Stock>> {
        self.stock_repo.list_stocks()
    }

    async fn upsert_stock(&self, stock: NewStock) -> bool {
        let symbol = stock.symbol.clone();
        if symbol.trim().is_empty() {
            error!("Refusing to upsert a stock with an empty symbol");
            return false;
        }
        match self.stock_repo.upsert_stock(stock).await {
            Ok(saved) => {
                debug!("Stock {} upserted ({})", saved.symbol, saved.name);
                true
            }
            Err(e) => {
                error!("Failed to upsert stock {}: {}", symbol, e);
                false
            }
        }
    }
}
