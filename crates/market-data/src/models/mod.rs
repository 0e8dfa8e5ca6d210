//! Canonical market data models
//!
//! - `quote` - The allow-listed quote snapshot (CanonicalQuote)
//! - `history` - Bounded daily history (CanonicalHistory, HistoryRecord)

mod history;
mod quote;

pub use history::{CanonicalHistory, HistoryRecord, DEFAULT_HISTORY_WINDOW};
pub use quote::CanonicalQuote;
