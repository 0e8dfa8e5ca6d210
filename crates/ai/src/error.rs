//! Analysis error types.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::budget::BudgetError;
use stockbrief_core::Error as CoreError;

/// Substrings of a provider message that mean the prompt was too big.
const SIZE_KEYWORDS: [&str; 6] = [
    "context length",
    "too long",
    "too large",
    "maximum context",
    "token limit",
    "payload too large",
];

/// Substrings of a provider message that mean the credentials are wrong.
const CONFIG_KEYWORDS: [&str; 4] = [
    "api key",
    "unauthorized",
    "invalid_api_key",
    "authentication",
];

// Status codes count only as standalone numbers, never inside counters or ids.
static CONFIG_STATUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b40[13]\b").expect("Invalid regex pattern"));
static SIZE_STATUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b413\b").expect("Invalid regex pattern"));

/// Errors raised while preparing or running a completion.
#[derive(Debug, Error)]
pub enum AiError {
    /// Missing API key for a provider.
    #[error("Missing API key for provider {0}")]
    MissingApiKey(String),

    /// Provider rejected the setup (unknown provider, bad credentials).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Prompt rejected for size.
    #[error("Size limit exceeded: {0}")]
    SizeLimit(String),

    /// Provider error (from rig-core or API).
    #[error("Provider error: {0}")]
    Provider(String),

    /// The prompt could not be rendered.
    #[error("Prompt error: {0}")]
    Budget(#[from] BudgetError),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// How the degradation ladder reacts to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Stops the run.
    Configuration,
    /// Try a smaller prompt.
    SizeLimit,
    /// Try the next rung.
    Transient,
}

impl AiError {
    /// Create a new provider error.
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create a new internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Classify by variant first, then by keywords in the provider message.
    pub fn class(&self) -> ErrorClass {
        match self {
            AiError::MissingApiKey(_) | AiError::Configuration(_) => ErrorClass::Configuration,
            AiError::SizeLimit(_) => ErrorClass::SizeLimit,
            AiError::Provider(message) => classify_message(message),
            AiError::Budget(_) | AiError::Internal(_) => ErrorClass::Transient,
        }
    }
}

/// Keyword classification of a raw provider message. Credential keywords
/// win over size keywords.
pub fn classify_message(message: &str) -> ErrorClass {
    let lower = message.to_lowercase();
    if CONFIG_KEYWORDS.iter().any(|k| lower.contains(k)) || CONFIG_STATUS.is_match(&lower) {
        ErrorClass::Configuration
    } else if SIZE_KEYWORDS.iter().any(|k| lower.contains(k)) || SIZE_STATUS.is_match(&lower) {
        ErrorClass::SizeLimit
    } else {
        ErrorClass::Transient
    }
}

impl From<AiError> for CoreError {
    fn from(err: AiError) -> Self {
        match err.class() {
            ErrorClass::Configuration => CoreError::Configuration(err.to_string()),
            _ => CoreError::Analysis(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_configuration() {
        let err = AiError::MissingApiKey("groq".to_string());
        assert_eq!(err.class(), ErrorClass::Configuration);
    }

    #[test]
    fn test_provider_messages_are_classified() {
        assert_eq!(
            AiError::provider("HTTP 401 Unauthorized").class(),
            ErrorClass::Configuration
        );
        assert_eq!(
            AiError::provider("error code: invalid_api_key").class(),
            ErrorClass::Configuration
        );
        assert_eq!(
            AiError::provider("This model's maximum context length is 8192 tokens").class(),
            ErrorClass::SizeLimit
        );
        assert_eq!(
            AiError::provider("HTTP 413: Request Entity Too Large").class(),
            ErrorClass::SizeLimit
        );
        assert_eq!(
            AiError::provider("connection reset by peer").class(),
            ErrorClass::Transient
        );
    }

    #[test]
    fn test_status_codes_only_match_as_whole_numbers() {
        assert_eq!(
            AiError::provider("HTTP status 403 Forbidden").class(),
            ErrorClass::Configuration
        );

        let rate_limited = "Rate limit reached for model `llama-3.1-8b-instant` on tokens per \
                            minute (TPM): Limit 6000, Used 5403, Requested 1200. \
                            Please try again in 6s.";
        assert_eq!(classify_message(rate_limited), ErrorClass::Transient);

        let server_error = "HTTP 500 Internal Server Error, request id req_84013abc";
        assert_eq!(classify_message(server_error), ErrorClass::Transient);

        assert_eq!(
            classify_message("invalid payload: missing field `messages`"),
            ErrorClass::Transient
        );
    }

    #[test]
    fn test_conversion_into_core_error() {
        let core: CoreError = AiError::MissingApiKey("openai".to_string()).into();
        assert!(core.is_configuration());

        let core: CoreError = AiError::provider("timeout").into();
        assert!(!core.is_configuration());
        assert!(matches!(core, CoreError::Analysis(_)));
    }
}
