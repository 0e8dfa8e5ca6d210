//! Snapshot domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stockbrief_market_data::{CanonicalHistory, CanonicalQuote};

use crate::errors::{Error, ValidationError};

/// Which canonical record a snapshot holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    Quote,
    History,
}

impl SnapshotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotKind::Quote => "quote",
            SnapshotKind::History => "history",
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SnapshotKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quote" => Ok(SnapshotKind::Quote),
            "history" => Ok(SnapshotKind::History),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown snapshot kind '{}'",
                other
            )))),
        }
    }
}

/// One stored canonical payload. There is at most one per (symbol, kind);
/// storing a new one replaces the old.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub symbol: String,
    pub kind: SnapshotKind,
    pub payload: Value,
    pub fetched_at: NaiveDateTime,
}

/// Latest stored market data for a symbol, decoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredMarketData {
    pub quote: Option<CanonicalQuote>,
    pub quote_fetched_at: Option<NaiveDateTime>,
    pub history: Option<CanonicalHistory>,
    pub history_fetched_at: Option<NaiveDateTime>,
}

impl StoredMarketData {
    pub fn is_empty(&self) -> bool {
        self.quote.is_none() && self.history.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [SnapshotKind::Quote, SnapshotKind::History] {
            assert_eq!(kind.as_str().parse::<SnapshotKind>().unwrap(), kind);
        }
        assert!("raw".parse::<SnapshotKind>().is_err());
    }
}
