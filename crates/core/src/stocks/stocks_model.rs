//! Stock domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use stockbrief_market_data::CanonicalQuote;

/// Domain model representing a tracked stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub symbol: String,
    pub name: String,
    pub exchange: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub currency: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating or updating a stock.
///
/// Upserts coalesce: a `None` field keeps whatever is stored.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewStock {
    pub symbol: String,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub currency: Option<String>,
}

impl NewStock {
    /// Minimal record whose name is the symbol itself.
    pub fn placeholder(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: Some(symbol.to_string()),
            ..Default::default()
        }
    }

    /// Metadata taken from a freshly normalized quote, if any.
    pub fn from_quote(symbol: &str, quote: Option<&CanonicalQuote>) -> Self {
        match quote {
            Some(q) => Self {
                symbol: symbol.to_string(),
                name: q.name.clone(),
                exchange: q.exchange.clone(),
                currency: q.currency.clone(),
                ..Default::default()
            },
            None => Self {
                symbol: symbol.to_string(),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_uses_symbol_as_name() {
        let stock = NewStock::placeholder("NESN.SW");
        assert_eq!(stock.name.as_deref(), Some("NESN.SW"));
        assert!(stock.exchange.is_none());
    }

    #[test]
    fn test_from_quote_copies_metadata() {
        let mut quote = CanonicalQuote::new("AAPL");
        quote.name = Some("Apple Inc.".to_string());
        quote.exchange = Some("NASDAQ".to_string());

        let stock = NewStock::from_quote("AAPL", Some(&quote));
        assert_eq!(stock.name.as_deref(), Some("Apple Inc."));
        assert_eq!(stock.exchange.as_deref(), Some("NASDAQ"));

        let bare = NewStock::from_quote("AAPL", None);
        assert!(bare.name.is_none());
    }
}
