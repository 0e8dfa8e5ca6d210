use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use log::{debug, error, info, warn};
use stockbrief_market_data::{
    normalize_history, normalize_quote, CanonicalHistory, CanonicalQuote, MarketDataProvider,
};

use crate::analysis::{AnalysisRequest, AnalyzerTrait};
use crate::answers::AnswerServiceTrait;
use crate::errors::{Error, Result};
use crate::pipeline::pipeline_model::{PipelineConfig, RunReport, SymbolOutcome, SymbolStatus};
use crate::questions::{QuestionServiceTrait, QuestionTemplate};
use crate::snapshots::SnapshotServiceTrait;
use crate::stocks::{NewStock, StockServiceTrait};

/// Runs symbols one at a time through fetch, normalize, store, analyze,
/// persist and verify.
///
/// A symbol's failure is recorded in the report and the run moves on. Only
/// configuration errors stop the run.
pub struct PipelineOrchestrator {
    provider: Arc<dyn MarketDataProvider>,
    analyzer: Arc<dyn AnalyzerTrait>,
    question_service: Arc<dyn QuestionServiceTrait>,
    stock_service: Arc<dyn StockServiceTrait>,
    snapshot_service: Arc<dyn SnapshotServiceTrait>,
    answer_service: Arc<dyn AnswerServiceTrait>,
    config: PipelineConfig,
}

impl PipelineOrchestrator {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        analyzer: Arc<dyn AnalyzerTrait>,
        question_service: Arc<dyn QuestionServiceTrait>,
        stock_service: Arc<dyn StockServiceTrait>,
        snapshot_service: Arc<dyn SnapshotServiceTrait>,
        answer_service: Arc<dyn AnswerServiceTrait>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            provider,
            analyzer,
            question_service,
            stock_service,
            snapshot_service,
            answer_service,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the configured symbol list.
    pub async fn run(&self) -> Result<RunReport> {
        self.run_symbols(&self.config.symbols).await
    }

    /// Run an explicit symbol list.
    pub async fn run_symbols(&self, symbols: &[String]) -> Result<RunReport> {
        let started = Instant::now();
        let mut report = RunReport::new(Utc::now());

        let questions = self.question_service.get_questions()?;
        if questions.is_empty() {
            return Err(Error::Configuration(
                "No questions configured; seed the question set first".to_string(),
            ));
        }

        info!(
            "Starting run {} over {} symbols with {} questions",
            report.run_id,
            symbols.len(),
            questions.len()
        );

        for (index, symbol) in symbols.iter().enumerate() {
            if index > 0 && !self.config.symbol_delay.is_zero() {
                tokio::time::sleep(self.config.symbol_delay).await;
            }

            info!("[{}/{}] Processing {}", index + 1, symbols.len(), symbol);
            let outcome = match self.process_symbol(symbol, &questions).await {
                Ok(outcome) => outcome,
                Err(e) if e.is_configuration() => {
                    error!("Aborting run {}: {}", report.run_id, e);
                    return Err(e);
                }
                Err(e) => {
                    error!("Unexpected failure for {}: {}", symbol, e);
                    SymbolOutcome::new(symbol, SymbolStatus::AnalysisFailed)
                        .with_message(e.to_string())
                }
            };

            info!(
                "{}: {} ({} of {} answers persisted)",
                symbol,
                outcome.status,
                outcome.persisted.len(),
                outcome.answers_attempted
            );
            report.record(outcome);
        }

        report.elapsed = started.elapsed();
        info!("{}", report);
        Ok(report)
    }

    /// Process one symbol. `Err` is reserved for configuration problems.
    pub async fn process_symbol(
        &self,
        symbol: &str,
        questions: &[QuestionTemplate],
    ) -> Result<SymbolOutcome> {
        let (fresh_quote, fresh_history) = self.fetch_and_normalize(symbol).await?;

        // Raw data is made durable before anything else looks at it.
        // A fetch that could not be stored does not count as fresh.
        let quote_stored = match &fresh_quote {
            Some(quote) => self.snapshot_service.store_quote(quote).await,
            None => false,
        };
        let history_stored = match &fresh_history {
            Some(history) => self.snapshot_service.store_history(history).await,
            None => false,
        };

        let stock_ready = self.ensure_stock(symbol, fresh_quote.as_ref()).await;

        let stored = match self.snapshot_service.load_latest(symbol) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Could not read stored market data for {}: {}", symbol, e);
                Default::default()
            }
        };

        if stored.is_empty() {
            warn!("No market data available for {}, skipping", symbol);
            return Ok(SymbolOutcome::new(symbol, SymbolStatus::DataFetchFailed)
                .with_message("no fresh or stored market data"));
        }

        let used_stale = (!quote_stored && stored.quote.is_some())
            || (!history_stored && stored.history.is_some());
        if used_stale {
            warn!("Fresh data incomplete for {}, using stored data", symbol);
        }

        if !stock_ready {
            return Ok(SymbolOutcome::new(symbol, SymbolStatus::AnalysisFailed)
                .with_message("stock record could not be written"));
        }

        let request = AnalysisRequest {
            symbol: symbol.to_string(),
            quote: stored.quote,
            history: stored.history,
            questions: questions.to_vec(),
        };
        let analysis = self.analyzer.analyze(&request).await?;

        let mut outcome = SymbolOutcome::new(symbol, SymbolStatus::AnalysisFailed);
        outcome.rung = Some(analysis.rung);
        outcome.answers_attempted = analysis.answers.len();

        if !analysis.rejected.is_empty() {
            debug!(
                "{}: rejected answers for questions {:?}",
                symbol, analysis.rejected
            );
        }

        let mut persisted = BTreeSet::new();
        for (question_id, text) in &analysis.answers {
            if self
                .answer_service
                .upsert_answer(symbol, *question_id, text)
                .await
                && self.answer_service.verify_answer(symbol, *question_id)
            {
                persisted.insert(*question_id);
            }
        }

        outcome.status = if persisted.is_empty() {
            SymbolStatus::AnalysisFailed
        } else if used_stale {
            SymbolStatus::DataStaleUsed
        } else if questions.iter().all(|q| persisted.contains(&q.id)) {
            SymbolStatus::Success
        } else {
            SymbolStatus::PartialSuccess
        };
        if analysis.is_failed() {
            outcome.message = Some("analysis ladder exhausted".to_string());
        }
        outcome.persisted = persisted;
        Ok(outcome)
    }

    /// Best-effort fetch. Transient failures become `None`; a rejected
    /// credential is returned as an error.
    async fn fetch_and_normalize(
        &self,
        symbol: &str,
    ) -> Result<(Option<CanonicalQuote>, Option<CanonicalHistory>)> {
        let quote = match self.provider.fetch_quote(symbol).await {
            Ok(raw) => normalize_quote(symbol, &raw),
            Err(e) if e.is_configuration() => return Err(e.into()),
            Err(e) => {
                warn!("{} quote fetch failed: {}", symbol, e);
                None
            }
        };

        let history = match self
            .provider
            .fetch_history(symbol, self.config.history_days)
            .await
        {
            Ok(raw) => normalize_history(symbol, &raw, self.config.history_days),
            Err(e) if e.is_configuration() => return Err(e.into()),
            Err(e) => {
                warn!("{} history fetch failed: {}", symbol, e);
                None
            }
        };

        Ok((quote, history))
    }

    /// Make sure a stock row exists before any answer is written. Falls back
    /// to a placeholder named after the symbol and retries once.
    async fn ensure_stock(&self, symbol: &str, quote: Option<&CanonicalQuote>) -> bool {
        if self
            .stock_service
            .upsert_stock(NewStock::from_quote(symbol, quote))
            .await
        {
            return true;
        }

        warn!("Stock upsert failed for {}, retrying with placeholder", symbol);
        self.stock_service
            .upsert_stock(NewStock::placeholder(symbol))
            .await
    }
}
