//! StockBrief AI - budgeted completion calls using rig-core.
//!
//! # Architecture
//!
//! - `budget`: renders market data and questions into a size-bounded prompt
//! - `completion`: completion client trait, rig-core client and a scripted fake
//! - `invoker`: degradation ladder (full, truncated, minimal) behind `AnalyzerTrait`
//! - `parser`: strict and lenient response grammars plus answer validation
//! - `error`: error type and failure classification
//!
//! # Example
//!
//! ```ignore
//! use stockbrief_ai::{AnalysisInvoker, CompletionSettings, RigCompletionClient};
//!
//! let client = RigCompletionClient::new(CompletionSettings {
//!     provider: LlmProvider::Groq,
//!     api_key: Some(key),
//!     ..Default::default()
//! })?;
//! let invoker = AnalysisInvoker::new(
//!     Arc::new(client),
//!     PromptBudgeter::default(),
//!     ValidationConfig::default(),
//!     InvokerConfig::default(),
//! );
//! let outcome = invoker.analyze(&request).await?;
//! ```

pub mod budget;
pub mod completion;
pub mod error;
pub mod invoker;
pub mod parser;


pub use budget::{
    compute_metrics, estimate_tokens, BudgetConfig, BudgetError, BudgetedPrompt, PriceMetrics,
    PromptBudgeter, CHARS_PER_TOKEN,
};
pub use completion::{
    CompletionClient, CompletionSettings, FakeCompletionClient, LlmProvider, RigCompletionClient,
};
pub use error::{AiError, ErrorClass};
pub use invoker::{AnalysisInvoker, InvokerConfig};
pub use parser::{
    clean_response, parse_response, validate_answers, ParsedResponse, ValidatedAnswers,
    ValidationConfig,
};
