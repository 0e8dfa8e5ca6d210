//! Market data provider trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::MarketDataError;

/// Trait for market data providers.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use serde_json::Value;
/// use stockbrief_market_data::{MarketDataError, MarketDataProvider};
///
/// struct StaticProvider;
///
/// #[async_trait]
/// impl MarketDataProvider for StaticProvider {
///     fn id(&self) -> &'static str {
///         "STATIC"
///     }
///
///     async fn fetch_quote(&self, symbol: &str) -> Result<Value, MarketDataError> {
///         Ok(serde_json::json!({ "symbol": symbol, "price": 1.0 }))
///     }
///
///     async fn fetch_history(&self, _symbol: &str, _days: usize) -> Result<Value, MarketDataError> {
///         Ok(serde_json::json!([]))
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Constant identifier like "FMP", used in logs and errors.
    fn id(&self) -> &'static str;

    /// Fetch the latest quote payload for a symbol.
    async fn fetch_quote(&self, symbol: &str) -> Result<Value, MarketDataError>;

    /// Fetch up to `days` daily records for a symbol.
    async fn fetch_history(&self, symbol: &str, days: usize) -> Result<Value, MarketDataError>;
}
