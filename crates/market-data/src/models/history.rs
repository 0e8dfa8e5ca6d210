use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of daily records kept by default.
pub const DEFAULT_HISTORY_WINDOW: usize = 30;

/// One trading day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub date: NaiveDate,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
}

/// Daily history for one symbol, newest record first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanonicalHistory {
    pub symbol: String,
    pub records: Vec<HistoryRecord>,
}

impl CanonicalHistory {
    /// Build a history, sorting newest first and keeping at most `window` records.
    pub fn new(symbol: impl Into<String>, mut records: Vec<HistoryRecord>, window: usize) -> Self {
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records.dedup_by(|a, b| a.date == b.date);
        records.truncate(window);
        Self {
            symbol: symbol.into(),
            records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Most recent record, if any.
    pub fn latest(&self) -> Option<&HistoryRecord> {
        self.records.first()
    }
}
