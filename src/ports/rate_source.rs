//! Currency conversion rate source port.
//!
//! The platform prices in EUR; localized storefront prices are derived
//! from a base-relative rate table supplied by an external service. A
//! source that cannot produce rates must say so - callers never fall back
//! to stale or zero rates silently.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};

/// Base-relative conversion rates at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTable {
    /// Base currency code the rates are relative to (e.g. "EUR").
    pub base: String,

    /// Uppercase currency code -> rate.
    pub rates: HashMap<String, f64>,

    /// When the table was fetched.
    pub fetched_at: Timestamp,
}

impl RateTable {
    /// Rate for a currency, matched case-insensitively.
    pub fn rate_for(&self, currency: &str) -> Option<f64> {
        self.rates.get(&currency.to_uppercase()).copied()
    }
}

/// Port supplying conversion rates relative to a base currency.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch a fresh rate table for the given base currency.
    async fn conversion_rates(&self, base: &str) -> Result<RateTable, RateError>;
}

/// Errors from rate lookups.
#[derive(Debug, Clone)]
pub enum RateError {
    /// Every configured credential failed; no rates are available.
    Unavailable(String),

    /// A single request failed (network, decode).
    Network(String),
}

impl std::fmt::Display for RateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateError::Unavailable(msg) => write!(f, "Exchange rates unavailable: {}", msg),
            RateError::Network(msg) => write!(f, "Exchange rate request failed: {}", msg),
        }
    }
}

impl std::error::Error for RateError {}

impl From<RateError> for DomainError {
    fn from(err: RateError) -> Self {
        DomainError::new(ErrorCode::UpstreamUnavailable, err.to_string())
    }
}
