//! Process configuration read from the environment.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use stockbrief_ai::{BudgetConfig, CompletionSettings, InvokerConfig, LlmProvider};
use stockbrief_core::constants::{DEFAULT_HISTORY_DAYS, DEFAULT_SYMBOLS, DEFAULT_SYMBOL_DELAY_SECS};
use stockbrief_core::errors::{Error, Result};
use stockbrief_core::pipeline::PipelineConfig;
use stockbrief_storage_sqlite::DEFAULT_DB_FILE;

const FMP_API_KEY: &str = "FMP_API_KEY";

/// Settings built once at startup and passed down read-only.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub symbols: Vec<String>,
    pub symbol_delay: Duration,
    pub history_days: usize,
    pub fmp_api_key: Option<String>,
    pub completion: CompletionSettings,
    pub budget: BudgetConfig,
    pub invoker: InvokerConfig,
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        // A missing .env file is the normal case in production.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let db_path = get("SB_DB_PATH").unwrap_or_else(|| {
            Path::new("data")
                .join(DEFAULT_DB_FILE)
                .to_string_lossy()
                .to_string()
        });

        let symbols = get("SB_SYMBOLS")
            .map(|raw| parse_symbols(&raw))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect());

        let provider = match get("SB_LLM_PROVIDER") {
            Some(raw) => LlmProvider::from_str(&raw)
                .map_err(|e| Error::InvalidConfigValue(format!("SB_LLM_PROVIDER: {}", e)))?,
            None => LlmProvider::default(),
        };
        let api_key = get("SB_LLM_API_KEY").or_else(|| provider.api_key_env().and_then(&get));

        let default_budget = BudgetConfig::default();
        let default_invoker = InvokerConfig::default();

        Ok(Self {
            db_path,
            symbols,
            symbol_delay: Duration::from_secs(parse_or(
                &get,
                "SB_SYMBOL_DELAY_SECS",
                DEFAULT_SYMBOL_DELAY_SECS,
            )?),
            history_days: parse_or(&get, "SB_HISTORY_DAYS", DEFAULT_HISTORY_DAYS)?,
            fmp_api_key: get(FMP_API_KEY),
            completion: CompletionSettings {
                provider,
                model: get("SB_LLM_MODEL").unwrap_or_default(),
                api_key,
                base_url: get("SB_LLM_BASE_URL"),
            },
            budget: BudgetConfig {
                budget_chars: parse_or(&get, "SB_PROMPT_BUDGET_CHARS", default_budget.budget_chars)?,
                ..default_budget
            },
            invoker: InvokerConfig {
                soft_token_ceiling: parse_or(
                    &get,
                    "SB_SOFT_TOKEN_CEILING",
                    default_invoker.soft_token_ceiling,
                )?,
                max_output_tokens: parse_or(
                    &get,
                    "SB_MAX_OUTPUT_TOKENS",
                    default_invoker.max_output_tokens,
                )?,
                temperature: parse_or(&get, "SB_TEMPERATURE", default_invoker.temperature)?,
                ..default_invoker
            },
        })
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            symbols: self.symbols.clone(),
            symbol_delay: self.symbol_delay,
            history_days: self.history_days,
        }
    }

    /// The market data key, required by every command that fetches.
    pub fn require_fmp_key(&self) -> Result<&str> {
        self.fmp_api_key
            .as_deref()
            .ok_or_else(|| Error::MissingConfigKey(FMP_API_KEY.to_string()))
    }

    /// Completion settings, checked for a key when the provider needs one.
    pub fn require_completion(&self) -> Result<CompletionSettings> {
        let provider = self.completion.provider;
        if provider.requires_api_key() && self.completion.api_key.is_none() {
            let key = provider.api_key_env().unwrap_or("SB_LLM_API_KEY");
            return Err(Error::MissingConfigKey(format!("SB_LLM_API_KEY or {}", key)));
        }
        Ok(self.completion.clone())
    }
}

/// Split a comma or whitespace separated list, upper-casing and de-duplicating.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for symbol in raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
    {
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| Error::InvalidConfigValue(format!("{}='{}': {}", key, raw, e))),
        None => Ok(default),
    }
}
