//! Analysis domain models.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use stockbrief_market_data::{CanonicalHistory, CanonicalQuote};

use crate::questions::QuestionTemplate;

/// Degradation ladder rung. Rungs only move downward during one analysis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LadderRung {
    /// Full prompt within the soft token ceiling.
    Full,
    /// Data section trimmed to fit the ceiling.
    Truncated,
    /// Price, change, volume and valuation only; first three questions.
    Minimal,
    /// No usable answer from any rung.
    Failed,
}

impl fmt::Display for LadderRung {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LadderRung::Full => "full",
            LadderRung::Truncated => "truncated",
            LadderRung::Minimal => "minimal",
            LadderRung::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Which response grammar produced the answers. Doubles as a confidence flag:
/// `Strict` is the most trustworthy, `Unmatched` means nothing was recovered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ParseGrammar {
    /// `question_id:` markers followed by `Answer n:` lines.
    Strict,
    /// `Answer n:` lines anywhere, markers ignored.
    AnswerLines,
    /// Lines starting with `n:` or `n.`.
    Numbered,
    #[default]
    Unmatched,
}

/// Everything an analyzer needs for one symbol, read back from storage.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub symbol: String,
    pub quote: Option<CanonicalQuote>,
    pub history: Option<CanonicalHistory>,
    pub questions: Vec<QuestionTemplate>,
}

/// Result of walking the degradation ladder for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    /// Rung that produced `answers`, or `Failed`.
    pub rung: LadderRung,
    /// Validated answers keyed by question id. Empty when `rung` is `Failed`.
    pub answers: BTreeMap<i64, String>,
    /// Ids whose parsed answers failed validation.
    pub rejected: Vec<i64>,
    pub grammar: ParseGrammar,
    /// Rungs that issued a completion call, in order.
    pub attempts: Vec<LadderRung>,
}

impl AnalysisOutcome {
    pub fn failed(attempts: Vec<LadderRung>) -> Self {
        Self {
            rung: LadderRung::Failed,
            answers: BTreeMap::new(),
            rejected: Vec::new(),
            grammar: ParseGrammar::Unmatched,
            attempts,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.rung == LadderRung::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rungs_are_ordered() {
        assert!(LadderRung::Full < LadderRung::Truncated);
        assert!(LadderRung::Truncated < LadderRung::Minimal);
        assert!(LadderRung::Minimal < LadderRung::Failed);
    }

    #[test]
    fn test_failed_outcome_is_empty() {
        let outcome = AnalysisOutcome::failed(vec![LadderRung::Full, LadderRung::Minimal]);
        assert!(outcome.is_failed());
        assert!(outcome.answers.is_empty());
        assert_eq!(outcome.attempts.len(), 2);
        assert_eq!(outcome.grammar, ParseGrammar::Unmatched);
    }
}
