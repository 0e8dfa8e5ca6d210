//! Prompt budgeting.
//!
//! Renders canonical market data and the question set into one prompt whose
//! length never exceeds a character budget. Token counts are estimated from
//! characters at [`CHARS_PER_TOKEN`]. The instructions and the question list
//! are never cut; only the data section shrinks.

use serde::Serialize;
use thiserror::Error;

use stockbrief_core::questions::QuestionTemplate;
use stockbrief_market_data::{CanonicalHistory, CanonicalQuote, HistoryRecord};

/// Characters per estimated token.
pub const CHARS_PER_TOKEN: usize = 4;

/// History records kept when trimming, as long as any existed.
pub const MIN_HISTORY_RECORDS: usize = 3;

/// Questions included in a minimal prompt.
pub const MINIMAL_QUESTION_COUNT: usize = 3;

const TRUNCATION_NOTICE: &str = "\n[data truncated to fit the prompt budget]";

const PREAMBLE: &str = "You are a financial analysis expert. Analyze the market data for the stock \
below and answer every question. Keep each answer concise (preferably under 100 words), \
professional and neutral. If a field you need is missing, say so briefly and continue. \
Evaluate this stock on its own without comparing it to other stocks.\n\n\
Use exactly this structure for every question, with no other text:\n\
question_id: <id>\n\
Answer <id>: <your answer>\n";

const CLOSING: &str = "\nAnswer every question above using the required structure.\n";

/// Estimated token count of a string.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BudgetError {
    #[error("No market data to analyze for {0}")]
    NoData(String),

    #[error("Instructions need {required} characters but the budget is {budget}")]
    BudgetTooSmall { required: usize, budget: usize },
}

/// Budget settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetConfig {
    /// Hard ceiling on the rendered prompt, in characters.
    pub budget_chars: usize,
    /// Serialized data above this size loses its oldest history records.
    pub trim_threshold_chars: usize,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            budget_chars: 16_000,
            trim_threshold_chars: 8_000,
        }
    }
}

/// A rendered prompt plus what had to be cut to produce it.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetedPrompt {
    pub text: String,
    /// The data section was hard-truncated.
    pub data_truncated: bool,
    /// History records dropped to get under the trim threshold.
    pub history_dropped: usize,
    pub estimated_tokens: usize,
}

/// Derived figures appended to the data section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_position_pct: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_from_high_pct: Option<f64>,
}

impl PriceMetrics {
    pub fn is_empty(&self) -> bool {
        self.range_position_pct.is_none() && self.distance_from_high_pct.is_none()
    }
}

/// Position of the price inside its 52-week range and distance from the high.
/// A figure is `None` when an input is missing or its denominator is zero.
pub fn compute_metrics(quote: &CanonicalQuote) -> PriceMetrics {
    let (Some(price), Some(low), Some(high)) = (quote.price, quote.year_low, quote.year_high)
    else {
        return PriceMetrics::default();
    };

    PriceMetrics {
        range_position_pct: ratio_pct(price - low, high - low),
        distance_from_high_pct: ratio_pct(high - price, high),
    }
}

fn ratio_pct(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    let value = numerator / denominator * 100.0;
    value.is_finite().then_some(value)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptData<'a> {
    symbol: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    quote: Option<&'a CanonicalQuote>,

    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<PriceMetrics>,

    #[serde(skip_serializing_if = "Option::is_none")]
    history: Option<&'a [HistoryRecord]>,
}

/// Renders prompts within a character budget.
#[derive(Debug, Clone, Default)]
pub struct PromptBudgeter {
    config: BudgetConfig,
}

impl PromptBudgeter {
    pub fn new(config: BudgetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BudgetConfig {
        &self.config
    }

    /// Render with the configured budget.
    pub fn render(
        &self,
        symbol: &str,
        quote: Option<&CanonicalQuote>,
        history: Option<&CanonicalHistory>,
        questions: &[QuestionTemplate],
    ) -> Result<BudgetedPrompt, BudgetError> {
        self.render_with_budget(symbol, quote, history, questions, self.config.budget_chars)
    }

    /// Render with an explicit budget in characters.
    pub fn render_with_budget(
        &self,
        symbol: &str,
        quote: Option<&CanonicalQuote>,
        history: Option<&CanonicalHistory>,
        questions: &[QuestionTemplate],
        budget_chars: usize,
    ) -> Result<BudgetedPrompt, BudgetError> {
        let records = history.map(|h| h.records.as_slice()).unwrap_or_default();
        if quote.is_none() && records.is_empty() {
            return Err(BudgetError::NoData(symbol.to_string()));
        }

        let metrics = quote.map(compute_metrics).filter(|m| !m.is_empty());
        let mut kept = records.len();
        let mut data = serialize_data(symbol, quote, metrics.clone(), &records[..kept]);
        while data.chars().count() > self.config.trim_threshold_chars
            && kept > MIN_HISTORY_RECORDS
        {
            kept -= 1;
            data = serialize_data(symbol, quote, metrics.clone(), &records[..kept]);
        }

        let mut prompt = assemble(symbol, questions, &data, budget_chars)?;
        prompt.history_dropped = records.len() - kept;
        Ok(prompt)
    }

    /// Render a reduced prompt: price, change, volume and valuation fields
    /// only, and the first [`MINIMAL_QUESTION_COUNT`] questions. Without a
    /// quote the latest history record stands in for it.
    pub fn render_minimal(
        &self,
        symbol: &str,
        quote: Option<&CanonicalQuote>,
        history: Option<&CanonicalHistory>,
        questions: &[QuestionTemplate],
    ) -> Result<BudgetedPrompt, BudgetError> {
        let minimal = match (quote, history.and_then(|h| h.latest())) {
            (Some(quote), _) => quote.minimal(),
            (None, Some(latest)) => CanonicalQuote {
                price: latest.close,
                change_percent: latest.change_percent,
                volume: latest.volume,
                ..CanonicalQuote::new(symbol)
            },
            (None, None) => return Err(BudgetError::NoData(symbol.to_string())),
        };

        let questions = &questions[..questions.len().min(MINIMAL_QUESTION_COUNT)];
        let data = serialize_data(symbol, Some(&minimal), None, &[]);
        assemble(symbol, questions, &data, self.config.budget_chars)
    }
}

fn serialize_data(
    symbol: &str,
    quote: Option<&CanonicalQuote>,
    metrics: Option<PriceMetrics>,
    history: &[HistoryRecord],
) -> String {
    let data = PromptData {
        symbol,
        quote,
        metrics,
        history: (!history.is_empty()).then_some(history),
    };
    // Plain structs of strings and finite floats always serialize.
    serde_json::to_string(&data).unwrap_or_default()
}

fn render_head(symbol: &str, questions: &[QuestionTemplate]) -> String {
    let mut head = String::from(PREAMBLE);
    head.push_str(&format!("\nStock symbol: {}\n\nQuestions:\n", symbol));
    for question in questions {
        head.push_str(&format!(
            "question_id: {}\nQuestion {}: {}\n",
            question.id, question.id, question.text
        ));
    }
    head.push_str("\nMarket data (JSON):\n");
    head
}

fn assemble(
    symbol: &str,
    questions: &[QuestionTemplate],
    data: &str,
    budget_chars: usize,
) -> Result<BudgetedPrompt, BudgetError> {
    let head = render_head(symbol, questions);
    let fixed = head.chars().count() + CLOSING.chars().count();
    if fixed > budget_chars {
        return Err(BudgetError::BudgetTooSmall {
            required: fixed,
            budget: budget_chars,
        });
    }

    let available = budget_chars - fixed;
    let data_chars = data.chars().count();
    let (section, data_truncated) = if data_chars <= available {
        (data.to_string(), false)
    } else {
        let notice_chars = TRUNCATION_NOTICE.chars().count();
        if available >= notice_chars {
            let mut cut = take_chars(data, available - notice_chars).to_string();
            cut.push_str(TRUNCATION_NOTICE);
            (cut, true)
        } else {
            (take_chars(data, available).to_string(), true)
        }
    };

    let text = format!("{}{}{}", head, section, CLOSING);
    let estimated_tokens = estimate_tokens(&text);
    Ok(BudgetedPrompt {
        text,
        data_truncated,
        history_dropped: 0,
        estimated_tokens,
    })
}

/// Prefix of at most `max_chars` characters, cut on a char boundary.
fn take_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn questions() -> Vec<QuestionTemplate> {
        vec![
            QuestionTemplate::new(1, "How is the stock trending?"),
            QuestionTemplate::new(2, "Is it fairly valued?"),
            QuestionTemplate::new(3, "What are the key risks?"),
            QuestionTemplate::new(4, "What do insiders signal?"),
        ]
    }

    fn quote() -> CanonicalQuote {
        CanonicalQuote {
            name: Some("Apple Inc.".to_string()),
            price: Some(150.0),
            year_low: Some(100.0),
            year_high: Some(200.0),
            volume: Some(1_000_000.0),
            exchange: Some("NASDAQ".to_string()),
            ..CanonicalQuote::new("AAPL")
        }
    }

    fn history(days: i64) -> CanonicalHistory {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let records = (0..days)
            .map(|i| HistoryRecord {
                date: start + Duration::days(i),
                open: Some(100.0 + i as f64),
                high: Some(101.0 + i as f64),
                low: Some(99.0 + i as f64),
                close: Some(100.5 + i as f64),
                volume: Some(50_000.0),
                change_percent: Some(0.5),
            })
            .collect();
        CanonicalHistory::new("AAPL", records, days as usize)
    }

    #[test]
    fn test_metrics_for_known_range() {
        let metrics = compute_metrics(&quote());
        assert_eq!(metrics.range_position_pct, Some(50.0));
        assert_eq!(metrics.distance_from_high_pct, Some(25.0));
    }

    #[test]
    fn test_metrics_skip_zero_denominators() {
        let flat = CanonicalQuote {
            price: Some(10.0),
            year_low: Some(10.0),
            year_high: Some(10.0),
            ..CanonicalQuote::new("FLAT")
        };
        let metrics = compute_metrics(&flat);
        assert_eq!(metrics.range_position_pct, None);
        assert!(metrics.distance_from_high_pct.is_some());

        let zero_high = CanonicalQuote {
            price: Some(0.0),
            year_low: Some(-5.0),
            year_high: Some(0.0),
            ..CanonicalQuote::new("ZERO")
        };
        assert_eq!(compute_metrics(&zero_high).distance_from_high_pct, None);
    }

    #[test]
    fn test_metrics_missing_field() {
        let partial = CanonicalQuote {
            price: Some(10.0),
            year_high: Some(12.0),
            ..CanonicalQuote::new("PART")
        };
        assert!(compute_metrics(&partial).is_empty());
    }

    #[test]
    fn test_render_contains_questions_and_data() {
        let budgeter = PromptBudgeter::default();
        let prompt = budgeter
            .render("AAPL", Some(&quote()), Some(&history(5)), &questions())
            .unwrap();

        assert!(!prompt.data_truncated);
        assert_eq!(prompt.history_dropped, 0);
        assert!(prompt.text.starts_with(PREAMBLE));
        for q in questions() {
            assert!(prompt.text.contains(&format!("question_id: {}", q.id)));
            assert!(prompt.text.contains(&q.text));
        }
        assert!(prompt.text.contains("\"rangePositionPct\":50.0"));
        assert!(prompt.text.contains("Apple Inc."));
        assert_eq!(prompt.estimated_tokens, estimate_tokens(&prompt.text));
    }

    #[test]
    fn test_no_data() {
        let budgeter = PromptBudgeter::default();
        let err = budgeter
            .render("AAPL", None, None, &questions())
            .unwrap_err();
        assert_eq!(err, BudgetError::NoData("AAPL".to_string()));

        let empty = CanonicalHistory::new("AAPL", vec![], 30);
        assert!(budgeter
            .render("AAPL", None, Some(&empty), &questions())
            .is_err());
    }

    #[test]
    fn test_budget_too_small() {
        let budgeter = PromptBudgeter::default();
        let err = budgeter
            .render_with_budget("AAPL", Some(&quote()), None, &questions(), 100)
            .unwrap_err();
        assert!(matches!(err, BudgetError::BudgetTooSmall { budget: 100, .. }));
    }

    #[test]
    fn test_trims_oldest_history_first() {
        let budgeter = PromptBudgeter::new(BudgetConfig {
            budget_chars: 50_000,
            trim_threshold_chars: 1_500,
        });
        let history = history(30);
        let prompt = budgeter
            .render("AAPL", Some(&quote()), Some(&history), &questions())
            .unwrap();

        assert!(prompt.history_dropped > 0);
        assert!(!prompt.data_truncated);
        // Newest record survives, oldest goes.
        assert!(prompt.text.contains("2024-01-30"));
        assert!(!prompt.text.contains("2024-01-01"));
    }

    #[test]
    fn test_keeps_three_records_when_trimming() {
        let budgeter = PromptBudgeter::new(BudgetConfig {
            budget_chars: 50_000,
            trim_threshold_chars: 10,
        });
        let prompt = budgeter
            .render("AAPL", None, Some(&history(30)), &questions())
            .unwrap();
        assert_eq!(prompt.history_dropped, 27);
    }

    #[test]
    fn test_hard_truncation_stays_within_budget() {
        let budgeter = PromptBudgeter::new(BudgetConfig {
            budget_chars: 50_000,
            trim_threshold_chars: 50_000,
        });
        let full = budgeter
            .render("AAPL", Some(&quote()), Some(&history(30)), &questions())
            .unwrap();
        let budget = full.text.chars().count() - 200;

        let cut = budgeter
            .render_with_budget("AAPL", Some(&quote()), Some(&history(30)), &questions(), budget)
            .unwrap();
        assert!(cut.data_truncated);
        assert!(cut.text.chars().count() <= budget);
        assert!(cut.text.contains(TRUNCATION_NOTICE));
        assert!(cut.text.ends_with(CLOSING));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let budgeter = PromptBudgeter::default();
        let wide = CanonicalQuote {
            name: Some("Nestlé Société Anonyme ünïcödé ".repeat(40)),
            ..CanonicalQuote::new("NESN.SW")
        };
        let head_len = render_head("NESN.SW", &questions()).chars().count()
            + CLOSING.chars().count();
        for extra in [10, 51, 97, 333] {
            let prompt = budgeter
                .render_with_budget("NESN.SW", Some(&wide), None, &questions(), head_len + extra)
                .unwrap();
            assert!(prompt.text.chars().count() <= head_len + extra);
        }
    }

    #[test]
    fn test_render_minimal() {
        let budgeter = PromptBudgeter::default();
        let prompt = budgeter
            .render_minimal("AAPL", Some(&quote()), Some(&history(5)), &questions())
            .unwrap();

        assert!(prompt.text.contains("question_id: 3"));
        assert!(!prompt.text.contains("question_id: 4"));
        assert!(prompt.text.contains("\"price\":150.0"));
        assert!(!prompt.text.contains("yearHigh"));
        assert!(!prompt.text.contains("exchange"));
        assert!(!prompt.text.contains("2024-01-0"));
    }

    #[test]
    fn test_render_minimal_from_history() {
        let budgeter = PromptBudgeter::default();
        let prompt = budgeter
            .render_minimal("AAPL", None, Some(&history(5)), &questions())
            .unwrap();
        assert!(prompt.text.contains("\"price\":104.5"));

        assert!(budgeter
            .render_minimal("AAPL", None, None, &questions())
            .is_err());
    }
}
