//! Raw payload normalization.
//!
//! Reduces whatever JSON a provider returns to the canonical, allow-listed
//! records. Both FMP field names and Yahoo-style names are recognized.
//!
//! The normalizer never fails: missing or unreadable fields become `None`,
//! and a payload that signals a provider error (or carries nothing usable)
//! normalizes to `None` as a whole.

use chrono::{DateTime, NaiveDate};
use log::debug;
use serde_json::{Map, Value};

use crate::models::{CanonicalHistory, CanonicalQuote, HistoryRecord};

// ============================================================================
// Field allow-lists
// ============================================================================

const NAME_KEYS: &[&str] = &["name", "longName", "shortName", "companyName"];
const EXCHANGE_KEYS: &[&str] = &["exchange", "fullExchangeName", "exchangeName"];
const CURRENCY_KEYS: &[&str] = &["currency"];

const PRICE_KEYS: &[&str] = &["price", "regularMarketPrice", "currentPrice"];
const CHANGE_KEYS: &[&str] = &["change", "regularMarketChange"];
const CHANGE_PERCENT_KEYS: &[&str] = &[
    "changesPercentage",
    "changePercentage",
    "changePercent",
    "regularMarketChangePercent",
];
const DAY_LOW_KEYS: &[&str] = &["dayLow", "regularMarketDayLow"];
const DAY_HIGH_KEYS: &[&str] = &["dayHigh", "regularMarketDayHigh"];
const YEAR_LOW_KEYS: &[&str] = &["yearLow", "fiftyTwoWeekLow"];
const YEAR_HIGH_KEYS: &[&str] = &["yearHigh", "fiftyTwoWeekHigh"];
const OPEN_KEYS: &[&str] = &["open", "regularMarketOpen"];
const PREVIOUS_CLOSE_KEYS: &[&str] = &["previousClose", "regularMarketPreviousClose"];
const VOLUME_KEYS: &[&str] = &["volume", "regularMarketVolume"];
const AVG_VOLUME_KEYS: &[&str] = &["avgVolume", "averageDailyVolume3Month", "averageVolume"];
const MARKET_CAP_KEYS: &[&str] = &["marketCap"];
const EPS_KEYS: &[&str] = &["eps", "epsTrailingTwelveMonths", "trailingEps"];
const PE_KEYS: &[&str] = &["pe", "trailingPE"];
const PRICE_AVG50_KEYS: &[&str] = &["priceAvg50", "fiftyDayAverage"];
const PRICE_AVG200_KEYS: &[&str] = &["priceAvg200", "twoHundredDayAverage"];
const SHARES_OUTSTANDING_KEYS: &[&str] = &["sharesOutstanding"];

const HISTORY_LIST_KEYS: &[&str] = &["historical", "prices", "history"];
const DATE_KEYS: &[&str] = &["date", "formattedDate", "timestamp"];
const CLOSE_KEYS: &[&str] = &["close", "adjClose"];
const HIGH_KEYS: &[&str] = &["high"];
const LOW_KEYS: &[&str] = &["low"];
const HISTORY_CHANGE_PERCENT_KEYS: &[&str] = &["changePercent", "changesPercentage"];

// ============================================================================
// Public API
// ============================================================================

/// Normalize a raw quote payload.
///
/// Accepts a quote object, an array whose first element is the quote (FMP),
/// or a Yahoo `quoteResponse.result` envelope.
pub fn normalize_quote(symbol: &str, raw: &Value) -> Option<CanonicalQuote> {
    if is_error_payload(raw) {
        debug!("Quote payload for {} carries an error status", symbol);
        return None;
    }

    let obj = unwrap_quote_object(raw)?;

    let quote = CanonicalQuote {
        symbol: text_field(obj, &["symbol"]).unwrap_or_else(|| symbol.to_string()),
        name: text_field(obj, NAME_KEYS),
        exchange: text_field(obj, EXCHANGE_KEYS),
        currency: text_field(obj, CURRENCY_KEYS),
        price: non_negative(number_field(obj, PRICE_KEYS)),
        change: number_field(obj, CHANGE_KEYS),
        change_percent: number_field(obj, CHANGE_PERCENT_KEYS),
        day_low: non_negative(number_field(obj, DAY_LOW_KEYS)),
        day_high: non_negative(number_field(obj, DAY_HIGH_KEYS)),
        year_low: non_negative(number_field(obj, YEAR_LOW_KEYS)),
        year_high: non_negative(number_field(obj, YEAR_HIGH_KEYS)),
        open: non_negative(number_field(obj, OPEN_KEYS)),
        previous_close: non_negative(number_field(obj, PREVIOUS_CLOSE_KEYS)),
        volume: non_negative(number_field(obj, VOLUME_KEYS)),
        avg_volume: non_negative(number_field(obj, AVG_VOLUME_KEYS)),
        market_cap: non_negative(number_field(obj, MARKET_CAP_KEYS)),
        eps: number_field(obj, EPS_KEYS),
        pe: number_field(obj, PE_KEYS),
        price_avg50: non_negative(number_field(obj, PRICE_AVG50_KEYS)),
        price_avg200: non_negative(number_field(obj, PRICE_AVG200_KEYS)),
        shares_outstanding: non_negative(number_field(obj, SHARES_OUTSTANDING_KEYS)),
    };

    // A name alone is not market data.
    let has_market_field = {
        let mut stripped = quote.clone();
        stripped.name = None;
        stripped.exchange = None;
        stripped.currency = None;
        !stripped.is_empty()
    };

    if has_market_field {
        Some(quote)
    } else {
        debug!("Quote payload for {} has no allow-listed fields", symbol);
        None
    }
}

/// Normalize a raw daily-history payload, keeping the newest `window` records.
///
/// Accepts `{ "historical": [...] }` (FMP), `{ "prices": [...] }` or a bare
/// array. Records without a readable date are dropped.
pub fn normalize_history(symbol: &str, raw: &Value, window: usize) -> Option<CanonicalHistory> {
    if is_error_payload(raw) {
        debug!("History payload for {} carries an error status", symbol);
        return None;
    }

    let (resolved_symbol, items) = match raw {
        Value::Array(items) => (symbol.to_string(), items),
        Value::Object(obj) => {
            let items = HISTORY_LIST_KEYS
                .iter()
                .find_map(|k| obj.get(*k).and_then(Value::as_array))?;
            let resolved = text_field(obj, &["symbol"]).unwrap_or_else(|| symbol.to_string());
            (resolved, items)
        }
        _ => return None,
    };

    let records: Vec<HistoryRecord> = items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(history_record)
        .collect();

    if records.is_empty() {
        debug!("History payload for {} has no dated records", symbol);
        return None;
    }

    Some(CanonicalHistory::new(resolved_symbol, records, window))
}

/// Detect provider error envelopes.
///
/// FMP answers bad keys and unknown endpoints with `{"Error Message": ...}`;
/// other providers use `error`, `status: "error"` or `ok: false`.
pub fn is_error_payload(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(obj) => {
            if obj.is_empty() {
                return true;
            }
            if obj.contains_key("Error Message") || obj.contains_key("error") {
                return true;
            }
            if let Some(status) = obj.get("status").and_then(Value::as_str) {
                if status.eq_ignore_ascii_case("error") || status.eq_ignore_ascii_case("fail") {
                    return true;
                }
            }
            matches!(obj.get("ok"), Some(Value::Bool(false)))
        }
        _ => true,
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn unwrap_quote_object(raw: &Value) -> Option<&Map<String, Value>> {
    match raw {
        Value::Array(items) => items.first().and_then(Value::as_object),
        Value::Object(obj) => {
            if let Some(result) = obj
                .get("quoteResponse")
                .and_then(|r| r.get("result"))
                .and_then(Value::as_array)
            {
                return result.first().and_then(Value::as_object);
            }
            Some(obj)
        }
        _ => None,
    }
}

fn history_record(obj: &Map<String, Value>) -> Option<HistoryRecord> {
    let date = DATE_KEYS.iter().find_map(|k| obj.get(*k).and_then(parse_date))?;
    Some(HistoryRecord {
        date,
        open: non_negative(number_field(obj, &["open"])),
        high: non_negative(number_field(obj, HIGH_KEYS)),
        low: non_negative(number_field(obj, LOW_KEYS)),
        close: non_negative(number_field(obj, CLOSE_KEYS)),
        volume: non_negative(number_field(obj, &["volume"])),
        change_percent: number_field(obj, HISTORY_CHANGE_PERCENT_KEYS),
    })
}

/// First alias that yields a finite number. Numeric strings are accepted.
fn number_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| obj.get(*k).and_then(as_number))
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        obj.get(*k)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').replace(',', "").parse::<f64>().ok(),
        // Yahoo quoteSummary style: { "raw": 1.0, "fmt": "1.00" }
        Value::Object(obj) => obj.get("raw").and_then(as_number),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn non_negative(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v >= 0.0)
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            let day = s.get(..10).unwrap_or(s);
            NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
        }
        Value::Number(n) => {
            let secs = n.as_i64()?;
            DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
        }
        _ => None,
    }
}
