//! Text-completion clients.
//!
//! [`CompletionClient`] is the seam between the invoker and the outside world.
//! [`RigCompletionClient`] talks to a hosted model through rig-core;
//! [`FakeCompletionClient`] replays scripted replies in tests.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use rig::{
    client::{CompletionClient as _, Nothing},
    completion::Prompt,
    providers::{anthropic, gemini, groq, ollama, openai},
};

use crate::error::AiError;

// ============================================================================
// Completion Client Trait
// ============================================================================

/// One prompt in, one reply out. No retries.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Provider label for logs.
    fn provider_id(&self) -> &str;

    async fn complete(
        &self,
        prompt: &str,
        max_output_tokens: u64,
        temperature: f64,
    ) -> Result<String, AiError>;
}

// ============================================================================
// Providers
// ============================================================================

/// Supported completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    #[default]
    Groq,
    OpenAi,
    Anthropic,
    Gemini,
    Ollama,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "groq",
            LlmProvider::OpenAi => "openai",
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::Gemini => "gemini",
            LlmProvider::Ollama => "ollama",
        }
    }

    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "llama-3.1-8b-instant",
            LlmProvider::OpenAi => "gpt-4o-mini",
            LlmProvider::Anthropic => "claude-3-5-haiku-latest",
            LlmProvider::Gemini => "gemini-1.5-flash",
            LlmProvider::Ollama => "llama3.1",
        }
    }

    /// Conventional environment variable holding the provider's key.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            LlmProvider::Groq => Some("GROQ_API_KEY"),
            LlmProvider::OpenAi => Some("OPENAI_API_KEY"),
            LlmProvider::Anthropic => Some("ANTHROPIC_API_KEY"),
            LlmProvider::Gemini => Some("GEMINI_API_KEY"),
            LlmProvider::Ollama => None,
        }
    }

    pub fn requires_api_key(&self) -> bool {
        self.api_key_env().is_some()
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(LlmProvider::Groq),
            "openai" => Ok(LlmProvider::OpenAi),
            "anthropic" => Ok(LlmProvider::Anthropic),
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(AiError::Configuration(format!(
                "Unknown completion provider '{}'",
                other
            ))),
        }
    }
}

/// Everything needed to reach a provider.
#[derive(Clone, Default)]
pub struct CompletionSettings {
    pub provider: LlmProvider,
    pub model: String,
    pub api_key: Option<String>,
    /// Override for OpenAI-compatible or self-hosted endpoints.
    pub base_url: Option<String>,
}

impl fmt::Debug for CompletionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSettings")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

// ============================================================================
// rig-core Client
// ============================================================================

/// Completion client backed by rig-core provider clients.
#[derive(Debug)]
pub struct RigCompletionClient {
    settings: CompletionSettings,
}

impl RigCompletionClient {
    /// Fails with `MissingApiKey` when the provider needs a key and none is set.
    pub fn new(mut settings: CompletionSettings) -> Result<Self, AiError> {
        if settings.provider.requires_api_key()
            && settings.api_key.as_deref().is_none_or(|k| k.trim().is_empty())
        {
            return Err(AiError::MissingApiKey(settings.provider.to_string()));
        }
        if settings.model.trim().is_empty() {
            settings.model = settings.provider.default_model().to_string();
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    fn api_key(&self) -> Result<String, AiError> {
        self.settings
            .api_key
            .clone()
            .ok_or_else(|| AiError::MissingApiKey(self.settings.provider.to_string()))
    }
}

macro_rules! prompt_agent {
    ($client:expr, $model:expr, $prompt:expr, $max_tokens:expr, $temperature:expr) => {{
        $client
            .agent($model)
            .temperature($temperature)
            .max_tokens($max_tokens)
            .build()
            .prompt($prompt)
            .await
            .map_err(|e| AiError::Provider(e.to_string()))
    }};
}

#[async_trait]
impl CompletionClient for RigCompletionClient {
    fn provider_id(&self) -> &str {
        self.settings.provider.as_str()
    }

    async fn complete(
        &self,
        prompt: &str,
        max_output_tokens: u64,
        temperature: f64,
    ) -> Result<String, AiError> {
        let model_id = self.settings.model.as_str();
        let prompt = prompt.to_string();

        debug!(
            "Completion with provider {} model {} ({} chars)",
            self.settings.provider,
            model_id,
            prompt.len()
        );

        match self.settings.provider {
            LlmProvider::Anthropic => {
                let key = self.api_key()?;
                let client: anthropic::Client<HttpClient> =
                    anthropic::Client::new(&key).map_err(|e| AiError::Provider(e.to_string()))?;
                prompt_agent!(client, model_id, &prompt, max_output_tokens, temperature)
            }
            LlmProvider::Gemini => {
                let key = self.api_key()?;
                let client: gemini::Client<HttpClient> =
                    gemini::Client::new(&key).map_err(|e| AiError::Provider(e.to_string()))?;
                prompt_agent!(client, model_id, &prompt, max_output_tokens, temperature)
            }
            LlmProvider::Groq => {
                let key = self.api_key()?;
                let client: groq::Client<HttpClient> =
                    groq::Client::new(&key).map_err(|e| AiError::Provider(e.to_string()))?;
                prompt_agent!(client, model_id, &prompt, max_output_tokens, temperature)
            }
            LlmProvider::Ollama => {
                let mut builder = ollama::Client::<HttpClient>::builder().api_key(Nothing);
                if let Some(url) = &self.settings.base_url {
                    builder = builder.base_url(url);
                }
                let client = builder
                    .build()
                    .map_err(|e| AiError::Provider(e.to_string()))?;
                prompt_agent!(client, model_id, &prompt, max_output_tokens, temperature)
            }
            LlmProvider::OpenAi => {
                // Completions API; also covers OpenAI-compatible endpoints via base_url.
                let key = self.api_key()?;
                let mut builder = openai::CompletionsClient::<HttpClient>::builder().api_key(&key);
                if let Some(url) = &self.settings.base_url {
                    builder = builder.base_url(url);
                }
                let client = builder
                    .build()
                    .map_err(|e| AiError::Provider(e.to_string()))?;
                prompt_agent!(client, model_id, &prompt, max_output_tokens, temperature)
            }
        }
    }
}

// ============================================================================
// Fake Client for Testing
// ============================================================================

/// A scripted client. Replies are consumed in order; every prompt is recorded.
#[derive(Default)]
pub struct FakeCompletionClient {
    replies: Mutex<VecDeque<Result<String, AiError>>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queue an error.
    pub fn fail(self, error: AiError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, reply: Result<String, AiError>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts().len()
    }
}

#[async_trait]
impl CompletionClient for FakeCompletionClient {
    fn provider_id(&self) -> &str {
        "fake"
    }

    async fn complete(
        &self,
        prompt: &str,
        _max_output_tokens: u64,
        _temperature: f64,
    ) -> Result<String, AiError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.replies
            .lock()
            .map_err(|_| AiError::internal("fake client lock poisoned"))?
            .pop_front()
            .unwrap_or_else(|| Err(AiError::provider("no scripted reply left")))
    }
}
