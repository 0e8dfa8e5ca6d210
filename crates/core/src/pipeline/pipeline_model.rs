//! Pipeline configuration and run reporting models.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::analysis::LadderRung;
use crate::constants::{DEFAULT_HISTORY_DAYS, DEFAULT_SYMBOLS, DEFAULT_SYMBOL_DELAY_SECS};

/// Read-only pipeline settings, built once at startup.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub symbols: Vec<String>,
    /// Pause between two symbols. Not applied after the last one.
    pub symbol_delay: Duration,
    pub history_days: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            symbol_delay: Duration::from_secs(DEFAULT_SYMBOL_DELAY_SECS),
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }
}

/// Final state of one symbol in a run.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SymbolStatus {
    /// Nothing fetched and nothing stored; the symbol was skipped.
    DataFetchFailed,
    /// Fresh fetch failed; answers were produced from stored data.
    DataStaleUsed,
    /// Data existed but no answer was persisted.
    AnalysisFailed,
    /// Some, but not all, questions were answered and persisted.
    PartialSuccess,
    /// Every question answered and persisted from fresh data.
    Success,
}

impl SymbolStatus {
    /// At least one answer was persisted.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            SymbolStatus::Success | SymbolStatus::PartialSuccess | SymbolStatus::DataStaleUsed
        )
    }

    pub fn is_skipped(&self) -> bool {
        *self == SymbolStatus::DataFetchFailed
    }
}

impl fmt::Display for SymbolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SymbolStatus::DataFetchFailed => "data_fetch_failed",
            SymbolStatus::DataStaleUsed => "data_stale_used",
            SymbolStatus::AnalysisFailed => "analysis_failed",
            SymbolStatus::PartialSuccess => "partial_success",
            SymbolStatus::Success => "success",
        };
        f.write_str(s)
    }
}

/// What happened to one symbol.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SymbolOutcome {
    pub symbol: String,
    pub status: SymbolStatus,
    /// Ladder rung reached, when analysis ran.
    pub rung: Option<LadderRung>,
    /// Answers the analyzer produced and the pipeline tried to write.
    pub answers_attempted: usize,
    /// Question ids written and verified.
    pub persisted: BTreeSet<i64>,
    pub message: Option<String>,
}

impl SymbolOutcome {
    pub(crate) fn new(symbol: &str, status: SymbolStatus) -> Self {
        Self {
            symbol: symbol.to_string(),
            status,
            rung: None,
            answers_attempted: 0,
            persisted: BTreeSet::new(),
            message: None,
        }
    }

    pub(crate) fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub answers_attempted: usize,
    pub answers_persisted: usize,
    pub elapsed: Duration,
    pub outcomes: Vec<SymbolOutcome>,
}

impl RunReport {
    pub(crate) fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            started_at,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            answers_attempted: 0,
            answers_persisted: 0,
            elapsed: Duration::ZERO,
            outcomes: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, outcome: SymbolOutcome) {
        self.attempted += 1;
        if outcome.status.is_skipped() {
            self.skipped += 1;
        } else if outcome.status.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.answers_attempted += outcome.answers_attempted;
        self.answers_persisted += outcome.persisted.len();
        self.outcomes.push(outcome);
    }

    /// True only when every symbol reached `Success` and every attempted answer persisted.
    pub fn is_complete_success(&self) -> bool {
        self.attempted > 0
            && self
                .outcomes
                .iter()
                .all(|o| o.status == SymbolStatus::Success)
            && self.answers_persisted == self.answers_attempted
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run {}: {} attempted, {} succeeded, {} failed, {} skipped; answers {}/{} persisted in {:.1}s",
            self.run_id,
            self.attempted,
            self.succeeded,
            self.failed,
            self.skipped,
            self.answers_persisted,
            self.answers_attempted,
            self.elapsed.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_tallies_statuses() {
        let mut report = RunReport::new(Utc::now());

        let mut ok = SymbolOutcome::new("AAPL", SymbolStatus::Success);
        ok.answers_attempted = 2;
        ok.persisted.extend([1, 2]);
        report.record(ok);

        let mut partial = SymbolOutcome::new("MSFT", SymbolStatus::PartialSuccess);
        partial.answers_attempted = 3;
        partial.persisted.insert(1);
        report.record(partial);

        report.record(SymbolOutcome::new("TSLA", SymbolStatus::AnalysisFailed));
        report.record(SymbolOutcome::new("BABA", SymbolStatus::DataFetchFailed));

        assert_eq!(report.attempted, 4);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.answers_attempted, 5);
        assert_eq!(report.answers_persisted, 3);
        assert!(!report.is_complete_success());
    }

    #[test]
    fn test_empty_report_is_not_success() {
        let report = RunReport::new(Utc::now());
        assert!(!report.is_complete_success());
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.symbols.len(), 15);
        assert_eq!(config.symbol_delay, Duration::from_secs(5));
        assert_eq!(config.history_days, 30);
    }
}
