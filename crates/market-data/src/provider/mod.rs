//! Market data provider abstraction and implementations.
//!
//! Providers return the raw JSON payload. Reducing it to canonical records is
//! the normalizer's job, so a provider never decides what is "enough" data.

pub mod fmp;
mod traits;

pub use traits::MarketDataProvider;
