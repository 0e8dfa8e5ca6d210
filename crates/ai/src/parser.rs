//! Response parsing.
//!
//! Model replies drift in format, so parsing tries three grammars in order
//! and reports which one matched:
//!
//! 1. Strict: `question_id: n` marker lines, each followed by `Answer n: ...`.
//! 2. Answer lines: `Answer n: ...` anywhere in a line, markers ignored.
//! 3. Numbered: lines starting with `n:` or `n.`.
//!
//! Each grammar is only tried when the previous one recovered nothing.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use stockbrief_core::analysis::ParseGrammar;

static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^question[ _]?id[\s*_]*:[\s*_]*(\d+)\b").expect("valid marker regex")
});

static STRICT_ANSWER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^answer[\s*_]*(\d+)[\s*_]*:[\s*_]*(.*)$").expect("valid answer regex")
});

static LOOSE_ANSWER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\banswer[\s*_]*(\d+)[\s*_]*:[\s*_]*(.*)$").expect("valid answer regex")
});

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:stock\s+name|stock\s+symbol|symbol|question(?:\s*\d+)?)[\s*_]*:")
        .expect("valid header regex")
});

static NUMBERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)[:.]\s+(.*)$").expect("valid numbered regex"));

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[A-Za-z0-9_-]*").expect("valid fence regex"));

static BLANK_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*)+\n").expect("valid blank-run regex"));

/// Answers recovered from a reply, keyed by question id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedResponse {
    pub answers: BTreeMap<i64, String>,
    pub grammar: ParseGrammar,
}

/// Strip code fences, trim, and collapse runs of blank lines to one.
pub fn clean_response(raw: &str) -> String {
    let without_fences = FENCE_RE.replace_all(raw, "");
    let normalized = without_fences.replace("\r\n", "\n");
    BLANK_RUN_RE
        .replace_all(normalized.trim(), "\n\n")
        .into_owned()
}

/// Parse a raw model reply.
pub fn parse_response(raw: &str) -> ParsedResponse {
    let text = clean_response(raw);

    let grammars: [(ParseGrammar, fn(&str) -> BTreeMap<i64, String>); 3] = [
        (ParseGrammar::Strict, parse_strict),
        (ParseGrammar::AnswerLines, parse_answer_lines),
        (ParseGrammar::Numbered, parse_numbered),
    ];

    for (grammar, parse) in grammars {
        let answers = parse(&text);
        if !answers.is_empty() {
            debug!("Parsed {} answers with {:?} grammar", answers.len(), grammar);
            return ParsedResponse { answers, grammar };
        }
    }

    ParsedResponse::default()
}

/// Markdown emphasis, heading and bullet characters around a line.
fn strip_decoration(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '#' | '-' | '>' | '`'))
}

fn answer_capture(re: &Regex, line: &str) -> Option<(i64, String)> {
    let caps = re.captures(line)?;
    let id = caps.get(1)?.as_str().parse().ok()?;
    let text = caps
        .get(2)
        .map(|m| m.as_str().trim().trim_end_matches(['*', '_']).trim())
        .unwrap_or_default();
    Some((id, text.to_string()))
}

fn marker_id(line: &str) -> Option<i64> {
    MARKER_RE.captures(line)?.get(1)?.as_str().parse().ok()
}

/// Collects multi-line answers. The last write for an id wins.
#[derive(Default)]
struct Accumulator {
    answers: BTreeMap<i64, String>,
    current: Option<(i64, String)>,
}

impl Accumulator {
    fn start(&mut self, id: i64, text: String) {
        self.flush();
        self.current = Some((id, text));
    }

    fn append(&mut self, line: &str) {
        if let Some((_, text)) = self.current.as_mut() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(line);
        }
    }

    fn flush(&mut self) {
        if let Some((id, text)) = self.current.take() {
            let text = text.trim();
            if !text.is_empty() {
                self.answers.insert(id, text.to_string());
            }
        }
    }

    fn finish(mut self) -> BTreeMap<i64, String> {
        self.flush();
        self.answers
    }
}

fn parse_strict(text: &str) -> BTreeMap<i64, String> {
    let mut acc = Accumulator::default();
    let mut pending: Option<i64> = None;

    for line in text.lines() {
        let stripped = strip_decoration(line);
        if stripped.is_empty() {
            continue;
        }

        if let Some(id) = marker_id(stripped) {
            acc.flush();
            pending = Some(id);
            continue;
        }

        if let Some((id, answer)) = answer_capture(&STRICT_ANSWER_RE, stripped) {
            if pending == Some(id) {
                acc.start(id, answer);
            } else {
                // An answer line without its marker belongs to no one.
                acc.flush();
            }
            pending = None;
            continue;
        }

        if HEADER_RE.is_match(stripped) {
            acc.flush();
            continue;
        }

        acc.append(line.trim());
    }

    acc.finish()
}

fn parse_answer_lines(text: &str) -> BTreeMap<i64, String> {
    let mut acc = Accumulator::default();

    for line in text.lines() {
        let stripped = strip_decoration(line);
        if stripped.is_empty() {
            continue;
        }

        if let Some((id, answer)) = answer_capture(&LOOSE_ANSWER_RE, stripped) {
            acc.start(id, answer);
            continue;
        }

        if marker_id(stripped).is_some() || HEADER_RE.is_match(stripped) {
            acc.flush();
            continue;
        }

        acc.append(line.trim());
    }

    acc.finish()
}

fn parse_numbered(text: &str) -> BTreeMap<i64, String> {
    let mut acc = Accumulator::default();

    for line in text.lines() {
        let stripped = strip_decoration(line);
        if stripped.is_empty() {
            continue;
        }

        if let Some((id, answer)) = answer_capture(&NUMBERED_RE, stripped) {
            acc.start(id, answer);
            continue;
        }

        acc.append(line.trim());
    }

    acc.finish()
}

// ============================================================================
// Validation
// ============================================================================

/// Rules an answer must pass before it is persisted.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Minimum trimmed length, in characters.
    pub min_answer_chars: usize,
    /// Lowercase phrases that mark a non-answer.
    pub failure_markers: Vec<String>,
    /// Drop ids outside the question set that was asked.
    pub known_ids_only: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_answer_chars: 10,
            failure_markers: [
                "unable to analyze",
                "analysis failed",
                "cannot provide an analysis",
                "as an ai language model",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            known_ids_only: true,
        }
    }
}

/// Answers split into those that passed validation and the rejected ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedAnswers {
    pub accepted: BTreeMap<i64, String>,
    pub rejected: Vec<i64>,
}

/// Filter parsed answers. Rejected ids are reported, never returned as answers.
pub fn validate_answers(
    answers: BTreeMap<i64, String>,
    config: &ValidationConfig,
    known_ids: &BTreeSet<i64>,
) -> ValidatedAnswers {
    let mut result = ValidatedAnswers::default();

    for (id, text) in answers {
        let text = text.trim();
        let lower = text.to_lowercase();
        let too_short = text.chars().count() < config.min_answer_chars;
        let failure = config
            .failure_markers
            .iter()
            .any(|marker| lower.contains(marker.as_str()));
        let unknown = config.known_ids_only && !known_ids.contains(&id);

        if too_short || failure || unknown {
            debug!(
                "Rejected answer {} (short={}, failure_marker={}, unknown={})",
                id, too_short, failure, unknown
            );
            result.rejected.push(id);
        } else {
            result.accepted.insert(id, text.to_string());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_grammar_with_headers() {
        let raw = "question_id: 1\nAnswer 1: Strong quarter.\nsymbol: X\nquestion_id: 2\nAnswer 2: Fairly valued.";
        let parsed = parse_response(raw);
        assert_eq!(parsed.grammar, ParseGrammar::Strict);
        assert_eq!(parsed.answers.len(), 2);
        assert_eq!(parsed.answers[&1], "Strong quarter.");
        assert_eq!(parsed.answers[&2], "Fairly valued.");
    }

    #[test]
    fn test_strict_grammar_joins_continuation_lines() {
        let raw = "Stock Name: Apple Inc.\nStock Symbol: AAPL\n\n\
                   **question_id: 1**\n**Answer 1:** Shares rose 4% this month,\n\
                   outpacing the 30-day average.\n\n\
                   Question 2: Is it overvalued?\n\
                   ### Question_ID: 2\nAnswer 2: Valuation looks stretched\nat 30x earnings.";
        let parsed = parse_response(raw);
        assert_eq!(parsed.grammar, ParseGrammar::Strict);
        assert_eq!(
            parsed.answers[&1],
            "Shares rose 4% this month, outpacing the 30-day average."
        );
        assert_eq!(
            parsed.answers[&2],
            "Valuation looks stretched at 30x earnings."
        );
    }

    #[test]
    fn test_strict_ignores_answer_without_matching_marker() {
        let raw = "question_id: 1\nAnswer 2: Wrong id here.\nquestion_id: 3\nAnswer 3: Correct pairing.";
        let parsed = parse_response(raw);
        assert_eq!(parsed.grammar, ParseGrammar::Strict);
        assert_eq!(parsed.answers.len(), 1);
        assert_eq!(parsed.answers[&3], "Correct pairing.");
    }

    #[test]
    fn test_header_ends_accumulation() {
        let raw = "question_id: 1\nAnswer 1: First part\nQuestion 2: What about valuation?\nquestion_id: 2\nAnswer 2: Second.";
        let parsed = parse_response(raw);
        assert_eq!(parsed.answers[&1], "First part");
    }

    #[test]
    fn test_duplicate_ids_last_write_wins() {
        let raw = "question_id: 1\nAnswer 1: Old text.\nquestion_id: 1\nAnswer 1: New text.";
        let parsed = parse_response(raw);
        assert_eq!(parsed.answers[&1], "New text.");
    }

    #[test]
    fn test_answer_lines_fallback() {
        let raw = "Here is my analysis.\n\nAnswer 1: Momentum is positive.\nAnswer 2: Valuation is rich.\n- **Answer 3:** Balance sheet is solid\nwith low debt.";
        let parsed = parse_response(raw);
        assert_eq!(parsed.grammar, ParseGrammar::AnswerLines);
        assert_eq!(parsed.answers[&1], "Momentum is positive.");
        assert_eq!(parsed.answers[&2], "Valuation is rich.");
        assert_eq!(parsed.answers[&3], "Balance sheet is solid with low debt.");
    }

    #[test]
    fn test_numbered_fallback() {
        let raw = "1. The stock is up 3% over the month.\n2: Trading near fair value\nbased on earnings.\n3. Cash flow is healthy.";
        let parsed = parse_response(raw);
        assert_eq!(parsed.grammar, ParseGrammar::Numbered);
        assert_eq!(parsed.answers[&1], "The stock is up 3% over the month.");
        assert_eq!(parsed.answers[&2], "Trading near fair value based on earnings.");
        assert_eq!(parsed.answers[&3], "Cash flow is healthy.");
    }

    #[test]
    fn test_unmatched() {
        let parsed = parse_response("I could not find anything useful in this data.");
        assert_eq!(parsed.grammar, ParseGrammar::Unmatched);
        assert!(parsed.answers.is_empty());

        let parsed = parse_response("");
        assert_eq!(parsed.grammar, ParseGrammar::Unmatched);
    }

    #[test]
    fn test_clean_response() {
        let raw = "  ```text\nquestion_id: 1\n\n\n\nAnswer 1: Fine.\n```  ";
        assert_eq!(clean_response(raw), "question_id: 1\n\nAnswer 1: Fine.");
    }

    #[test]
    fn test_fenced_reply_parses() {
        let raw = "```\nquestion_id: 1\nAnswer 1: Inside a code fence.\n```";
        let parsed = parse_response(raw);
        assert_eq!(parsed.answers[&1], "Inside a code fence.");
    }

    #[test]
    fn test_validation_rules() {
        let mut answers = BTreeMap::new();
        answers.insert(1, "Solid growth in revenue.".to_string());
        answers.insert(2, "Too short".to_string());
        answers.insert(3, "Unable to analyze this stock with the data.".to_string());
        answers.insert(9, "An answer to a question nobody asked.".to_string());

        let known: BTreeSet<i64> = [1, 2, 3].into_iter().collect();
        let result = validate_answers(answers, &ValidationConfig::default(), &known);

        assert_eq!(result.accepted.len(), 1);
        assert!(result.accepted.contains_key(&1));
        assert_eq!(result.rejected, vec![2, 3, 9]);
    }

    #[test]
    fn test_validation_can_keep_unknown_ids() {
        let mut answers = BTreeMap::new();
        answers.insert(9, "An answer to a question nobody asked.".to_string());
        let config = ValidationConfig {
            known_ids_only: false,
            ..ValidationConfig::default()
        };
        let result = validate_answers(answers, &config, &BTreeSet::new());
        assert!(result.accepted.contains_key(&9));
    }
}
