use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use stockbrief_ai::{
    AnalysisInvoker, CompletionClient, PromptBudgeter, RigCompletionClient, ValidationConfig,
};
use stockbrief_core::{
    answers::AnswerService,
    errors::{Error, Result},
    pipeline::PipelineOrchestrator,
    questions::{QuestionService, QuestionServiceTrait},
    snapshots::SnapshotService,
    stocks::StockService,
};
use stockbrief_market_data::{normalize_quote, FmpProvider, MarketDataProvider};
use stockbrief_storage_sqlite::{
    open, AnswerRepository, QuestionRepository, SnapshotRepository, StockRepository,
};

use crate::config::Config;

pub struct AppState {
    pub question_service: Arc<QuestionService>,
    pub stock_service: Arc<StockService>,
    pub snapshot_service: Arc<SnapshotService>,
    pub answer_service: Arc<AnswerService>,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("SB_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Open the database and wire repositories into services. The default
/// question set is seeded on first use.
pub async fn build_state(config: &Config) -> Result<Arc<AppState>> {
    let (pool, writer) = open(&config.db_path)?;
    info!("Database path in use: {}", config.db_path);

    let question_repo = Arc::new(QuestionRepository::new(pool.clone(), writer.clone()));
    let question_service = Arc::new(QuestionService::new(question_repo));
    question_service.initialize_default_questions().await?;

    let stock_repo = Arc::new(StockRepository::new(pool.clone(), writer.clone()));
    let snapshot_repo = Arc::new(SnapshotRepository::new(pool.clone(), writer.clone()));
    let answer_repo = Arc::new(AnswerRepository::new(pool, writer));

    Ok(Arc::new(AppState {
        question_service,
        stock_service: Arc::new(StockService::new(stock_repo)),
        snapshot_service: Arc::new(SnapshotService::new(snapshot_repo)),
        answer_service: Arc::new(AnswerService::new(answer_repo)),
        db_path: config.db_path.clone(),
    }))
}

fn build_provider(config: &Config) -> Result<Arc<dyn MarketDataProvider>> {
    let key = config.require_fmp_key()?;
    Ok(Arc::new(FmpProvider::new(key.to_string())))
}

fn build_client(config: &Config) -> Result<Arc<dyn CompletionClient>> {
    let client = RigCompletionClient::new(config.require_completion()?)?;
    Ok(Arc::new(client))
}

/// Wire the full pipeline. Fails only on missing or invalid credentials.
pub fn build_orchestrator(state: &AppState, config: &Config) -> Result<PipelineOrchestrator> {
    let invoker = AnalysisInvoker::new(
        build_client(config)?,
        PromptBudgeter::new(config.budget.clone()),
        ValidationConfig::default(),
        config.invoker.clone(),
    );

    Ok(PipelineOrchestrator::new(
        build_provider(config)?,
        Arc::new(invoker),
        state.question_service.clone(),
        state.stock_service.clone(),
        state.snapshot_service.clone(),
        state.answer_service.clone(),
        config.pipeline(),
    ))
}

/// Result of one connectivity check.
#[derive(Debug)]
pub struct CheckResult {
    pub target: String,
    pub ok: bool,
    pub detail: String,
}

const CHECK_PROMPT: &str = "Reply with the single word OK.";

/// Fetch one quote and request one short completion.
///
/// Rejected credentials come back as `Err`; any other failure is reported
/// in the check result.
pub async fn preflight(config: &Config, symbol: &str) -> Result<Vec<CheckResult>> {
    let provider = build_provider(config)?;
    let client = build_client(config)?;
    let mut results = Vec::with_capacity(2);

    let market = match provider.fetch_quote(symbol).await {
        Ok(raw) => match normalize_quote(symbol, &raw) {
            Some(quote) => CheckResult {
                target: provider.id().to_string(),
                ok: true,
                detail: format!("{} price {:?}", quote.symbol, quote.price),
            },
            None => CheckResult {
                target: provider.id().to_string(),
                ok: false,
                detail: format!("no usable quote for {}", symbol),
            },
        },
        Err(e) if e.is_configuration() => return Err(e.into()),
        Err(e) => CheckResult {
            target: provider.id().to_string(),
            ok: false,
            detail: e.to_string(),
        },
    };
    results.push(market);

    let completion = match client.complete(CHECK_PROMPT, 16, 0.0).await {
        Ok(reply) => CheckResult {
            target: client.provider_id().to_string(),
            ok: !reply.trim().is_empty(),
            detail: reply.trim().chars().take(60).collect(),
        },
        Err(e) => {
            let err = Error::from(e);
            if err.is_configuration() {
                return Err(err);
            }
            CheckResult {
                target: client.provider_id().to_string(),
                ok: false,
                detail: err.to_string(),
            }
        }
    };
    results.push(completion);

    for result in &results {
        if !result.ok {
            warn!("Preflight {} failed: {}", result.target, result.detail);
        }
    }
    Ok(results)
}
