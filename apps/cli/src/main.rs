//! StockBrief CLI - fetch market data, ask the question set, store answers.
//!
//! Commands:
//! - `run` - analyze the configured (or given) symbols once or on an interval
//! - `questions` - seed and list the question set
//! - `answers` - print stored answers for a symbol
//! - `check` - connectivity preflight against both providers
//! - `prune` - remove stale answers and snapshots
//! - `forget` - delete everything stored for a symbol

mod config;
mod main_lib;
mod scheduler;

use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use stockbrief_core::answers::AnswerServiceTrait;
use stockbrief_core::constants::{DEFAULT_ANSWER_RETENTION_DAYS, DEFAULT_SNAPSHOT_RETENTION_DAYS};
use stockbrief_core::errors::Error;
use stockbrief_core::questions::QuestionServiceTrait;
use stockbrief_core::snapshots::SnapshotServiceTrait;

use config::{parse_symbols, Config};
use main_lib::{build_orchestrator, build_state, init_tracing, preflight, AppState};

#[derive(Parser)]
#[command(
    name = "stockbrief",
    about = "StockBrief - per-symbol market analysis answers",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, analyze and store answers for every symbol.
    Run {
        /// Comma separated symbols. Defaults to SB_SYMBOLS or the built-in list.
        #[arg(long)]
        symbols: Option<String>,

        /// Repeat the batch every N hours until interrupted.
        #[arg(
            long,
            value_parser = clap::value_parser!(u64)
                .range(scheduler::MIN_INTERVAL_HOURS..=scheduler::MAX_INTERVAL_HOURS)
        )]
        every_hours: Option<u64>,

        /// Print the run report as JSON on stdout.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Seed the question set if empty and list it.
    Questions,
    /// Print the stored answers for a symbol.
    Answers {
        symbol: String,
    },
    /// Fetch one quote and request one short completion.
    Check {
        /// Symbol used for the market data check.
        #[arg(long, default_value = "AAPL")]
        symbol: String,
    },
    /// Remove answers and snapshots that were not refreshed recently.
    Prune {
        /// Answers older than this many days are removed.
        #[arg(long, default_value_t = DEFAULT_ANSWER_RETENTION_DAYS)]
        days: i64,

        /// Snapshots older than this many days are removed.
        #[arg(long, default_value_t = DEFAULT_SNAPSHOT_RETENTION_DAYS)]
        snapshot_days: i64,
    },
    /// Delete every stored answer and snapshot for a symbol.
    Forget {
        symbol: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_tracing();

    let result = match config {
        Ok(config) => execute(cli.command, &config).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(command: Commands, config: &Config) -> anyhow::Result<()> {
    // The preflight never touches the database.
    if let Commands::Check { symbol } = &command {
        return check(config, &symbol.to_uppercase()).await;
    }

    let state = build_state(config)
        .await
        .context("Failed to open the database")?;

    match command {
        Commands::Run {
            symbols,
            every_hours,
            json,
        } => run(&state, config, symbols, every_hours, json).await,
        Commands::Questions => list_questions(&state),
        Commands::Answers { symbol } => list_answers(&state, &symbol.to_uppercase()),
        Commands::Check { .. } => Ok(()),
        Commands::Prune {
            days,
            snapshot_days,
        } => prune(&state, days, snapshot_days).await,
        Commands::Forget { symbol } => forget(&state, &symbol.to_uppercase()).await,
    }
}

async fn run(
    state: &AppState,
    config: &Config,
    symbols: Option<String>,
    every_hours: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(state, config)?;
    let symbols = symbols
        .map(|raw| parse_symbols(&raw))
        .filter(|list| !list.is_empty())
        .unwrap_or_else(|| orchestrator.config().symbols.clone());

    if let Some(hours) = every_hours {
        scheduler::run_every(&orchestrator, &symbols, hours).await?;
        return Ok(());
    }

    let report = orchestrator.run_symbols(&symbols).await?;
    for outcome in &report.outcomes {
        match &outcome.message {
            Some(message) => info!("{}: {} ({})", outcome.symbol, outcome.status, message),
            None => info!(
                "{}: {} ({} answers)",
                outcome.symbol,
                outcome.status,
                outcome.persisted.len()
            ),
        }
    }
    if report.is_complete_success() {
        info!("{}", report);
    } else {
        warn!("{}", report);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn list_questions(state: &AppState) -> anyhow::Result<()> {
    for question in state.question_service.get_questions()? {
        println!("{:>3}  {}", question.id, question.text);
    }
    Ok(())
}

fn list_answers(state: &AppState, symbol: &str) -> anyhow::Result<()> {
    let answers = state.answer_service.get_answers(symbol)?;
    if answers.is_empty() {
        println!("No answers stored for {}", symbol);
        return Ok(());
    }

    for answer in answers {
        let question = state
            .question_service
            .get_question(answer.question_id)?
            .map(|q| q.text)
            .unwrap_or_else(|| format!("Question {}", answer.question_id));
        println!("[{}] {}", answer.updated_at.format("%Y-%m-%d %H:%M"), question);
        println!("    {}\n", answer.answer_text);
    }
    Ok(())
}

async fn check(config: &Config, symbol: &str) -> anyhow::Result<()> {
    let results = preflight(config, symbol).await?;
    for result in &results {
        let mark = if result.ok { "ok" } else { "FAILED" };
        println!("{:<10} {:<7} {}", result.target, mark, result.detail);
    }
    Ok(())
}

async fn prune(state: &AppState, days: i64, snapshot_days: i64) -> anyhow::Result<()> {
    if days < 0 || snapshot_days < 0 {
        let err = Error::InvalidConfigValue("retention days must not be negative".to_string());
        return Err(err.into());
    }
    let answers = state.answer_service.prune_answers(days).await?;
    let snapshots = state.snapshot_service.prune_snapshots(snapshot_days).await?;
    info!(
        "Pruned {} answers older than {} days and {} snapshots older than {} days",
        answers, days, snapshots, snapshot_days
    );
    Ok(())
}

async fn forget(state: &AppState, symbol: &str) -> anyhow::Result<()> {
    let answers = state.answer_service.delete_for_symbol(symbol).await?;
    let snapshots = state.snapshot_service.delete_for_symbol(symbol).await?;
    info!(
        "Removed {} answers and {} snapshots for {} from {}",
        answers, snapshots, symbol, state.db_path
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_hours_range() {
        let cli = Cli::try_parse_from(["stockbrief", "run", "--every-hours", "12"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Run {
                every_hours: Some(12),
                ..
            }
        ));

        assert!(Cli::try_parse_from(["stockbrief", "run", "--every-hours", "0"]).is_err());
        assert!(Cli::try_parse_from(["stockbrief", "run", "--every-hours", "100000"]).is_err());
        assert!(Cli::try_parse_from([
            "stockbrief",
            "run",
            "--every-hours",
            "18446744073709551615"
        ])
        .is_err());
    }
}
