//! HTTP exchange-rate client with multi-key fallback.
//!
//! The upstream service meters per API key, so the client rotates through
//! every configured key until one answers. When all keys fail the error
//! surfaces as `Unavailable`; callers never see stale or zero rates.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::foundation::Timestamp;
use crate::ports::{RateError, RateSource, RateTable};

/// Exchange-rate API client configuration.
#[derive(Clone)]
pub struct ExchangeRateConfig {
    /// API keys tried in order.
    api_keys: Vec<SecretString>,

    /// Base URL of the rate service.
    api_base_url: String,

    /// Per-request timeout.
    request_timeout: Duration,
}

impl ExchangeRateConfig {
    pub fn new(api_keys: Vec<String>) -> Self {
        Self {
            api_keys: api_keys.into_iter().map(SecretString::new).collect(),
            api_base_url: "https://v6.exchangerate-api.com".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// `RateSource` implementation over the exchangerate HTTP API.
pub struct ExchangeRateClient {
    config: ExchangeRateConfig,
    http_client: reqwest::Client,
}

impl ExchangeRateClient {
    pub fn new(config: ExchangeRateConfig) -> Result<Self, RateError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RateError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, http_client })
    }

    async fn fetch_with_key(&self, key: &SecretString, base: &str) -> Result<RateTable, RateError> {
        let url = format!(
            "{}/v6/{}/latest/{}",
            self.config.api_base_url,
            key.expose_secret(),
            base.to_uppercase()
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| RateError::Network(format!("request failed: {}", e)))?;

        let body: RatesResponse = response
            .json()
            .await
            .map_err(|e| RateError::Network(format!("failed to decode response: {}", e)))?;

        if body.result != "success" {
            return Err(RateError::Network(format!(
                "service answered with result '{}'",
                body.result
            )));
        }

        Ok(RateTable {
            base: base.to_uppercase(),
            rates: body.conversion_rates,
            fetched_at: Timestamp::now(),
        })
    }
}

#[async_trait]
impl RateSource for ExchangeRateClient {
    async fn conversion_rates(&self, base: &str) -> Result<RateTable, RateError> {
        if self.config.api_keys.is_empty() {
            return Err(RateError::Unavailable("no API keys configured".to_string()));
        }

        for (index, key) in self.config.api_keys.iter().enumerate() {
            match self.fetch_with_key(key, base).await {
                Ok(table) => return Ok(table),
                Err(err) => {
                    tracing::warn!(
                        key_index = index,
                        error = %err,
                        "Exchange rate API key failed, trying next"
                    );
                }
            }
        }

        Err(RateError::Unavailable(
            "all exchange rate API keys failed".to_string(),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    result: String,
    #[serde(default)]
    conversion_rates: HashMap<String, f64>,
}
