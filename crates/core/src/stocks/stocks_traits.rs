use crate::errors::Result;
use crate::stocks::stocks_model::{NewStock, Stock};
use async_trait::async_trait;

/// Trait for stock repository operations
#[async_trait]
pub trait StockRepositoryTrait: Send + Sync {
    fn get_stock(&self, symbol: &str) -> Result<Option<Stock>>;
    fn list_stocks(&self) -> Result<Vec<Stock>>;
    /// Insert, or update coalescing `None` fields to the stored values.
    /// A newly inserted stock without a name is named after its symbol.
    async fn upsert_stock(&self, stock: NewStock) -> Result<Stock>;
}

/// Trait for stock service operations
#[async_trait]
pub trait StockServiceTrait: Send + Sync {
    fn get_stock(&self, symbol: &str) -> Result<Option<Stock>>;
    fn get_stocks(&self) -> Result<Vec<Stock>>;
    /// Write failures are logged and reported as `false`.
    async fn upsert_stock(&self, stock: NewStock) -> bool;
}
