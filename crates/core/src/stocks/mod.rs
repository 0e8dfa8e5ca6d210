//! Stocks module - the stock record every answer depends on.

mod stocks_model;
mod stocks_service;
mod stocks_traits;

pub use stocks_model::{NewStock, Stock};
pub use stocks_service::StockService;
pub use stocks_traits::{StockRepositoryTrait, StockServiceTrait};
