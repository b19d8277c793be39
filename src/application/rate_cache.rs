//! Cached exchange-rate service.
//!
//! Owns the rate table as explicit instance state with a defined
//! lifecycle: fetched on first use, replaced by `refresh`, and optionally
//! kept warm by a spawned timer loop. A total upstream failure surfaces an
//! error; callers never receive stale-marked-fresh or zero rates.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::{RateSource, RateTable};

/// In-process cache over a `RateSource`.
pub struct ExchangeRateService {
    source: Arc<dyn RateSource>,
    base: String,
    cache: RwLock<Option<RateTable>>,
}

impl ExchangeRateService {
    /// Creates a service caching rates relative to `base`.
    pub fn new(source: Arc<dyn RateSource>, base: impl Into<String>) -> Self {
        Self {
            source,
            base: base.into(),
            cache: RwLock::new(None),
        }
    }

    /// Returns the cached rate table, fetching it first if the cache is
    /// still empty.
    pub async fn rates(&self) -> Result<RateTable, DomainError> {
        if let Some(table) = self.cache.read().await.clone() {
            return Ok(table);
        }
        self.refresh().await?;
        self.cache
            .read()
            .await
            .clone()
            .ok_or_else(|| DomainError::new(
                crate::domain::foundation::ErrorCode::UpstreamUnavailable,
                "rate cache empty after refresh",
            ))
    }

    /// Replaces the cached table with a fresh fetch.
    ///
    /// On failure the previous table (if any) is kept, so a transient
    /// upstream outage doesn't blank an already-warm cache.
    pub async fn refresh(&self) -> Result<(), DomainError> {
        let table = self.source.conversion_rates(&self.base).await?;
        *self.cache.write().await = Some(table);
        Ok(())
    }

    /// When the cached table was fetched, if one is present.
    pub async fn last_updated(&self) -> Option<Timestamp> {
        self.cache.read().await.as_ref().map(|t| t.fetched_at)
    }

    /// Spawns a background loop refreshing the cache on an interval.
    /// Failures are logged and retried at the next tick.
    pub fn spawn_refresh(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // first tick fires immediately and warms the cache
            loop {
                ticker.tick().await;
                if let Err(err) = self.refresh().await {
                    tracing::warn!(error = %err, "Exchange rate refresh failed");
                }
            }
        })
    }
}
