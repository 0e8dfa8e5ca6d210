//! Financial Modeling Prep (FMP) market data provider.
//!
//! Endpoints used:
//! - `/quote/{symbol}` for the latest quote (returns a one-element array)
//! - `/historical-price-full/{symbol}?timeseries=N` for daily history
//!
//! The free tier is limited to a few calls per minute, so every request goes
//! through the provider's own token bucket.
//! API documentation: https://site.financialmodelingprep.com/developer/docs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::provider::MarketDataProvider;
use crate::rate_limiter::{RateLimit, RateLimiter};

const BASE_URL: &str = "https://financialmodelingprep.com/api/v3";
const PROVIDER_ID: &str = "FMP";

// ============================================================================
// API Response Structures
// ============================================================================

/// Error envelope FMP returns for bad keys and plan restrictions.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

// ============================================================================
// FmpProvider
// ============================================================================

/// FMP market data provider.
pub struct FmpProvider {
    client: Client,
    api_key: String,
    base_url: String,
    limiter: RateLimiter,
}

impl FmpProvider {
    /// Create a new FMP provider with the given API key.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL.to_string())
    }

    /// Create a provider against a different host (proxies, tests).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            limiter: RateLimiter::new(PROVIDER_ID, Self::rate_limit()),
        }
    }

    /// FMP free tier pacing.
    pub fn rate_limit() -> RateLimit {
        RateLimit {
            requests_per_minute: 30,
            burst_capacity: 2.0,
        }
    }

    fn endpoint_url(&self, path: &str, symbol: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            path,
            urlencoding::encode(symbol)
        )
    }

    /// Make a GET request and decode the JSON body.
    async fn fetch(&self, url: &str, params: &[(&str, String)]) -> Result<Value, MarketDataError> {
        self.limiter.acquire().await;

        let mut request = self.client.get(url).query(&[("apikey", self.api_key.as_str())]);
        for (key, value) in params {
            request = request.query(&[(key, value)]);
        }

        debug!("FMP request: {} with {} params", url, params.len());

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("Request failed: {}", e),
                }
            }
        })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::Unauthorized {
                provider: PROVIDER_ID.to_string(),
                message: error_message(&body).unwrap_or_else(|| "Invalid or missing API key".to_string()),
            });
        }

        // Plan limit / daily quota exceeded
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: error_message(&body).unwrap_or_else(|| format!("HTTP {} - {}", status, body)),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to read response: {}", e),
            })?;

        // FMP reports a bad key with HTTP 200 on some plans.
        if let Some(message) = error_message(&body) {
            if message.to_lowercase().contains("api key") {
                return Err(MarketDataError::Unauthorized {
                    provider: PROVIDER_ID.to_string(),
                    message,
                });
            }
            warn!("FMP returned an error envelope: {}", message);
        }

        serde_json::from_str(&body).map_err(|e| MarketDataError::InvalidPayload {
            provider: PROVIDER_ID.to_string(),
            message: e.to_string(),
        })
    }
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|r| r.error_message)
}

#[async_trait]
impl MarketDataProvider for FmpProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Value, MarketDataError> {
        let url = self.endpoint_url("quote", symbol);
        let payload = self.fetch(&url, &[]).await?;

        if payload.as_array().is_some_and(|a| a.is_empty()) {
            return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
        }
        Ok(payload)
    }

    async fn fetch_history(&self, symbol: &str, days: usize) -> Result<Value, MarketDataError> {
        let url = self.endpoint_url("historical-price-full", symbol);
        let payload = self.fetch(&url, &[("timeseries", days.to_string())]).await?;

        // Unknown symbols come back as `{}`.
        if payload.as_object().is_some_and(|o| o.is_empty()) {
            return Err(MarketDataError::NoData(symbol.to_string()));
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id() {
        let provider = FmpProvider::new("test_key".to_string());
        assert_eq!(provider.id(), "FMP");
    }

    #[test]
    fn test_endpoint_url_encodes_symbol() {
        let provider =
            FmpProvider::with_base_url("k".to_string(), "http://localhost:9/api/v3/".to_string());
        assert_eq!(
            provider.endpoint_url("quote", "NESN.SW"),
            "http://localhost:9/api/v3/quote/NESN.SW"
        );
        assert_eq!(
            provider.endpoint_url("quote", "BRK/B"),
            "http://localhost:9/api/v3/quote/BRK%2FB"
        );
    }

    #[test]
    fn test_error_message_parsing() {
        let body = r#"{"Error Message":"Invalid API KEY. Please retry or visit our documentation."}"#;
        assert!(error_message(body).unwrap().starts_with("Invalid API KEY"));
        assert!(error_message(r#"[{"symbol":"AAPL"}]"#).is_none());
        assert!(error_message("not json").is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_provider_error() {
        let provider =
            FmpProvider::with_base_url("k".to_string(), "http://127.0.0.1:9".to_string());
        let err = provider.fetch_quote("AAPL").await.unwrap_err();
        assert!(err.is_transient());
    }
}
