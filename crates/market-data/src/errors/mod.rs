//! Error types for the market data crate.

use thiserror::Error;

/// Errors that can occur while fetching market data from a provider.
///
/// Normalization never produces an error; a payload that cannot be read is
/// reported as "no data" by the normalizer instead.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider does not know the requested symbol.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider answered but the payload was empty.
    #[error("No data returned for {0}")]
    NoData(String),

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider rejected the credential (HTTP 401/403).
    #[error("Unauthorized: {provider} - {message}")]
    Unauthorized {
        /// The provider that rejected the request
        provider: String,
        /// Message returned by the provider
        message: String,
    },

    /// A provider-specific error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The response body could not be decoded as JSON.
    #[error("Invalid payload from {provider}: {message}")]
    InvalidPayload {
        /// The provider that sent the payload
        provider: String,
        /// Decoder message
        message: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Whether retrying later, or falling back to stored data, can help.
    ///
    /// Credential rejections are not transient: every following symbol would
    /// fail the same way.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout { .. } | Self::Network(_) => true,
            Self::ProviderError { .. } | Self::InvalidPayload { .. } => true,
            Self::SymbolNotFound(_) | Self::NoData(_) => false,
            Self::Unauthorized { .. } => false,
        }
    }

    /// Whether the error points at a missing or rejected credential.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}
