//! Property-based tests for prompt budgeting and response parsing.
//!
//! These tests verify that universal properties hold across all valid inputs,
//! using the `proptest` crate for random test case generation.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use stockbrief_ai::{parse_response, BudgetConfig, BudgetError, PromptBudgeter};
use stockbrief_core::analysis::ParseGrammar;
use stockbrief_core::questions::QuestionTemplate;
use stockbrief_market_data::{CanonicalHistory, CanonicalQuote, HistoryRecord};

// =============================================================================
// Generators
// =============================================================================

fn arb_quote() -> impl Strategy<Value = CanonicalQuote> {
    (
        proptest::option::of("\\PC{0,80}"),          // name
        proptest::option::of(0.0f64..10_000.0),      // price
        proptest::option::of(0.0f64..10_000.0),      // year low
        proptest::option::of(0.0f64..10_000.0),      // year high
        proptest::option::of(0.0f64..1.0e12),        // market cap
    )
        .prop_map(|(name, price, year_low, year_high, market_cap)| CanonicalQuote {
            name,
            price,
            year_low,
            year_high,
            market_cap,
            ..CanonicalQuote::new("TEST")
        })
}

fn arb_history() -> impl Strategy<Value = CanonicalHistory> {
    proptest::collection::vec((0.0f64..1_000.0, 0.0f64..1.0e9), 0..45).prop_map(|rows| {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, (close, volume))| HistoryRecord {
                date: start + Duration::days(i as i64),
                open: Some(close),
                high: Some(close * 1.01),
                low: Some(close * 0.99),
                close: Some(close),
                volume: Some(volume),
                change_percent: None,
            })
            .collect();
        CanonicalHistory::new("TEST", records, 30)
    })
}

fn arb_questions() -> impl Strategy<Value = Vec<QuestionTemplate>> {
    proptest::collection::vec("[A-Za-z ]{5,60}\\?", 1..6).prop_map(|texts| {
        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| QuestionTemplate::new(i as i64 + 1, text))
            .collect()
    })
}

fn arb_answers() -> impl Strategy<Value = BTreeMap<i64, String>> {
    proptest::collection::btree_map(1i64..50, "[A-Za-z][A-Za-z ,]{8,40}[A-Za-z.]", 1..8)
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A rendered prompt never exceeds its budget and always carries the
    /// instructions and every question unmodified.
    #[test]
    fn prop_prompt_within_budget(
        quote in proptest::option::of(arb_quote()),
        history in arb_history(),
        questions in arb_questions(),
        budget in 0usize..12_000,
        threshold in 200usize..8_000,
    ) {
        let budgeter = PromptBudgeter::new(BudgetConfig {
            budget_chars: budget,
            trim_threshold_chars: threshold,
        });

        match budgeter.render("TEST", quote.as_ref(), Some(&history), &questions) {
            Ok(prompt) => {
                prop_assert!(prompt.text.chars().count() <= budget);
                prop_assert!(prompt.text.starts_with("You are a financial analysis expert."));
                for q in &questions {
                    let line = format!("Question {}: {}", q.id, q.text);
                    prop_assert!(prompt.text.contains(&line));
                }
            }
            Err(BudgetError::NoData(_)) => {
                prop_assert!(quote.is_none() && history.is_empty());
            }
            Err(BudgetError::BudgetTooSmall { required, budget: b }) => {
                prop_assert!(required > b);
            }
        }
    }

    /// Answers rendered in the strict grammar parse back to the same map.
    #[test]
    fn prop_strict_round_trip(answers in arb_answers()) {
        let rendered = answers
            .iter()
            .map(|(id, text)| format!("question_id: {}\nAnswer {}: {}", id, id, text))
            .collect::<Vec<_>>()
            .join("\n");

        let parsed = parse_response(&rendered);
        prop_assert_eq!(parsed.grammar, ParseGrammar::Strict);
        prop_assert_eq!(parsed.answers, answers);
    }

    /// `Answer n:` lines without markers are recovered by the fallback grammar.
    #[test]
    fn prop_answer_lines_fallback(answers in arb_answers()) {
        let rendered = answers
            .iter()
            .map(|(id, text)| format!("Answer {}: {}", id, text))
            .collect::<Vec<_>>()
            .join("\n");

        let parsed = parse_response(&rendered);
        prop_assert_eq!(parsed.grammar, ParseGrammar::AnswerLines);
        prop_assert_eq!(parsed.answers, answers);
    }

    /// Arbitrary text never panics the parser.
    #[test]
    fn prop_parser_total(raw in "\\PC*(\n\\PC*){0,10}") {
        let parsed = parse_response(&raw);
        if parsed.answers.is_empty() {
            prop_assert_eq!(parsed.grammar, ParseGrammar::Unmatched);
        }
    }
}
