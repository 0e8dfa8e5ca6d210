//! Degradation ladder around the completion client.
//!
//! `Full` sends the whole budgeted prompt, `Truncated` a prompt cut down to
//! the soft token ceiling, `Minimal` a price-and-valuation prompt with the
//! first three questions. A rung that errors, replies too briefly or yields no
//! valid answer hands over to the next one. Credential errors skip the ladder
//! and stop the run.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use stockbrief_core::analysis::{AnalysisOutcome, AnalysisRequest, AnalyzerTrait, LadderRung};
use stockbrief_core::questions::QuestionTemplate;
use stockbrief_core::{Error, Result};

use crate::budget::{
    BudgetError, BudgetedPrompt, PromptBudgeter, CHARS_PER_TOKEN, MINIMAL_QUESTION_COUNT,
};
use crate::completion::CompletionClient;
use crate::error::ErrorClass;
use crate::parser::{parse_response, validate_answers, ValidationConfig};

/// Invoker settings.
#[derive(Debug, Clone)]
pub struct InvokerConfig {
    /// Prompts estimated above this many tokens start at `Truncated`.
    pub soft_token_ceiling: usize,
    pub max_output_tokens: u64,
    pub temperature: f64,
    /// Shorter replies count as a failed rung.
    pub min_response_chars: usize,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            soft_token_ceiling: 3_000,
            max_output_tokens: 1_500,
            temperature: 0.7,
            min_response_chars: 50,
        }
    }
}

/// Analyzer that walks the degradation ladder.
pub struct AnalysisInvoker {
    client: Arc<dyn CompletionClient>,
    budgeter: PromptBudgeter,
    validation: ValidationConfig,
    config: InvokerConfig,
}

impl AnalysisInvoker {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        budgeter: PromptBudgeter,
        validation: ValidationConfig,
        config: InvokerConfig,
    ) -> Self {
        Self {
            client,
            budgeter,
            validation,
            config,
        }
    }

    pub fn config(&self) -> &InvokerConfig {
        &self.config
    }

    /// Pick the first rung and its prompt. `None` means go straight to `Minimal`.
    fn first_prompt(
        &self,
        request: &AnalysisRequest,
    ) -> std::result::Result<Option<(LadderRung, BudgetedPrompt)>, BudgetError> {
        let symbol = &request.symbol;
        let quote = request.quote.as_ref();
        let history = request.history.as_ref();
        let ceiling = self.config.soft_token_ceiling;

        match self.budgeter.render(symbol, quote, history, &request.questions) {
            Ok(prompt) if prompt.estimated_tokens <= ceiling && !prompt.data_truncated => {
                return Ok(Some((LadderRung::Full, prompt)));
            }
            Ok(prompt) => {
                warn!(
                    "{}: prompt of ~{} tokens exceeds ceiling {}, truncating",
                    symbol, prompt.estimated_tokens, ceiling
                );
            }
            Err(BudgetError::BudgetTooSmall { required, budget }) => {
                warn!(
                    "{}: instructions need {} chars, budget {}; trying a truncated prompt",
                    symbol, required, budget
                );
            }
            Err(e) => return Err(e),
        }

        let budget = self
            .budgeter
            .config()
            .budget_chars
            .min(ceiling.saturating_mul(CHARS_PER_TOKEN));
        match self
            .budgeter
            .render_with_budget(symbol, quote, history, &request.questions, budget)
        {
            Ok(prompt) => Ok(Some((LadderRung::Truncated, prompt))),
            Err(BudgetError::BudgetTooSmall { .. }) => {
                warn!("{}: truncated prompt does not fit, skipping to minimal", symbol);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// One completion call. `Ok(None)` means this rung failed softly.
    async fn attempt(
        &self,
        symbol: &str,
        rung: LadderRung,
        prompt: &BudgetedPrompt,
        questions: &[QuestionTemplate],
    ) -> Result<Option<AnalysisOutcome>> {
        debug!(
            "{}: {} rung, ~{} tokens, {} history records dropped",
            symbol, rung, prompt.estimated_tokens, prompt.history_dropped
        );

        let reply = match self
            .client
            .complete(
                &prompt.text,
                self.config.max_output_tokens,
                self.config.temperature,
            )
            .await
        {
            Ok(reply) => reply,
            Err(e) => match e.class() {
                ErrorClass::Configuration => {
                    return Err(Error::Configuration(format!(
                        "{} rejected the request: {}",
                        self.client.provider_id(),
                        e
                    )));
                }
                ErrorClass::SizeLimit => {
                    warn!("{}: {} rung rejected for size: {}", symbol, rung, e);
                    return Ok(None);
                }
                ErrorClass::Transient => {
                    warn!("{}: {} rung failed: {}", symbol, rung, e);
                    return Ok(None);
                }
            },
        };

        let reply_chars = reply.trim().chars().count();
        if reply_chars < self.config.min_response_chars {
            warn!(
                "{}: {} rung reply too short ({} chars)",
                symbol, rung, reply_chars
            );
            return Ok(None);
        }

        let parsed = parse_response(&reply);
        let known: BTreeSet<i64> = questions.iter().map(|q| q.id).collect();
        let validated = validate_answers(parsed.answers, &self.validation, &known);

        if validated.accepted.is_empty() {
            warn!(
                "{}: {} rung produced no valid answers ({:?} grammar, {} rejected)",
                symbol,
                rung,
                parsed.grammar,
                validated.rejected.len()
            );
            return Ok(None);
        }

        Ok(Some(AnalysisOutcome {
            rung,
            answers: validated.accepted,
            rejected: validated.rejected,
            grammar: parsed.grammar,
            attempts: Vec::new(),
        }))
    }
}

#[async_trait]
impl AnalyzerTrait for AnalysisInvoker {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome> {
        let symbol = request.symbol.as_str();
        let mut attempts = Vec::new();

        let first = match self.first_prompt(request) {
            Ok(first) => first,
            Err(e) => {
                warn!("{}: {}", symbol, e);
                return Ok(AnalysisOutcome::failed(attempts));
            }
        };

        if let Some((rung, prompt)) = first {
            attempts.push(rung);
            if let Some(mut outcome) = self
                .attempt(symbol, rung, &prompt, &request.questions)
                .await?
            {
                outcome.attempts = attempts;
                info!(
                    "{}: {} answers from {} rung",
                    symbol,
                    outcome.answers.len(),
                    rung
                );
                return Ok(outcome);
            }
            warn!("{}: falling back to minimal prompt", symbol);
        }

        let minimal = match self.budgeter.render_minimal(
            symbol,
            request.quote.as_ref(),
            request.history.as_ref(),
            &request.questions,
        ) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!("{}: minimal prompt unavailable: {}", symbol, e);
                return Ok(AnalysisOutcome::failed(attempts));
            }
        };

        attempts.push(LadderRung::Minimal);
        let asked = &request.questions[..request.questions.len().min(MINIMAL_QUESTION_COUNT)];
        match self
            .attempt(symbol, LadderRung::Minimal, &minimal, asked)
            .await?
        {
            Some(mut outcome) => {
                outcome.attempts = attempts;
                info!(
                    "{}: {} answers from minimal rung",
                    symbol,
                    outcome.answers.len()
                );
                Ok(outcome)
            }
            None => {
                warn!("{}: every rung failed", symbol);
                Ok(AnalysisOutcome::failed(attempts))
            }
        }
    }
}
