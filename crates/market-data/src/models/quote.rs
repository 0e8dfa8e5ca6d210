use serde::{Deserialize, Serialize};

/// Allow-listed quote snapshot for one symbol.
///
/// Every field except `symbol` may be unknown. Unknown fields are skipped
/// when serialized so the compact form only carries what the provider gave.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalQuote {
    pub symbol: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Current/last price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_low: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_high: Option<f64>,

    /// 52-week low
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_low: Option<f64>,

    /// 52-week high
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_high: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_volume: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub eps: Option<f64>,

    /// Price/earnings ratio
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pe: Option<f64>,

    /// 50-day average price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_avg50: Option<f64>,

    /// 200-day average price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_avg200: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares_outstanding: Option<f64>,
}

impl CanonicalQuote {
    /// Create an empty quote for a symbol
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// True when no field besides the symbol is known.
    pub fn is_empty(&self) -> bool {
        *self == Self::new(self.symbol.clone())
    }

    /// Reduced copy used for the minimal prompt: price, change, volume and
    /// valuation fields only.
    pub fn minimal(&self) -> Self {
        Self {
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            price: self.price,
            change: self.change,
            change_percent: self.change_percent,
            volume: self.volume,
            market_cap: self.market_cap,
            eps: self.eps,
            pe: self.pe,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_not_serialized() {
        let mut quote = CanonicalQuote::new("AAPL");
        quote.price = Some(187.5);
        let json = serde_json::to_string(&quote).unwrap();
        assert_eq!(json, r#"{"symbol":"AAPL","price":187.5}"#);
    }

    #[test]
    fn test_is_empty() {
        let mut quote = CanonicalQuote::new("AAPL");
        assert!(quote.is_empty());
        quote.year_high = Some(200.0);
        assert!(!quote.is_empty());
    }

    #[test]
    fn test_minimal_drops_ranges() {
        let quote = CanonicalQuote {
            symbol: "MSFT".to_string(),
            price: Some(410.0),
            pe: Some(35.2),
            year_low: Some(300.0),
            year_high: Some(430.0),
            avg_volume: Some(2.0e7),
            ..Default::default()
        };
        let minimal = quote.minimal();
        assert_eq!(minimal.price, Some(410.0));
        assert_eq!(minimal.pe, Some(35.2));
        assert_eq!(minimal.year_low, None);
        assert_eq!(minimal.avg_volume, None);
    }
}
