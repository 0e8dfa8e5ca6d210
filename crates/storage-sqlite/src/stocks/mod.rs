//! SQLite storage implementation for stocks.

mod model;
mod repository;

pub use model::StockDB;
pub use repository::StockRepository;

// Re-export trait from core for convenience
pub use stockbrief_core::stocks::StockRepositoryTrait;
