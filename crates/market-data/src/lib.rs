//! StockBrief Market Data Crate
//!
//! Fetches raw quote and history payloads from a market data provider and
//! reduces them to canonical, size-bounded records.
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+     +------------------+
//! |    Provider      | --> |   raw JSON Value | --> |   Normalizer     |
//! |  (FMP, mocks)    |     |  (unbounded)     |     |  (allow-list)    |
//! +------------------+     +------------------+     +------------------+
//!                                                           |
//!                                                           v
//!                                           CanonicalQuote / CanonicalHistory
//! ```
//!
//! # Core Types
//!
//! - [`CanonicalQuote`] - Allow-listed quote snapshot
//! - [`CanonicalHistory`] - Newest-first daily records bounded to a window
//! - [`MarketDataProvider`] - Raw payload source
//! - [`MarketDataError`] - Fetch failures

pub mod errors;
pub mod models;
pub mod normalizer;
pub mod provider;
pub mod rate_limiter;

pub use errors::MarketDataError;
pub use models::{CanonicalHistory, CanonicalQuote, HistoryRecord, DEFAULT_HISTORY_WINDOW};
pub use normalizer::{is_error_payload, normalize_history, normalize_quote};
pub use provider::fmp::FmpProvider;
pub use provider::MarketDataProvider;
pub use rate_limiter::{RateLimit, RateLimiter};
