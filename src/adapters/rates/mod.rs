//! Exchange-rate adapter implementing the `RateSource` port.

mod exchange_rate_client;

pub use exchange_rate_client::{ExchangeRateClient, ExchangeRateConfig};
