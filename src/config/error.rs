//! Configuration error types.

use thiserror::Error;

/// Errors while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Errors from semantic validation of loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(&'static str),

    #[error("DATABASE_URL must start with postgres:// or postgresql://")]
    InvalidDatabaseUrl,

    #[error("Stripe API key must start with sk_")]
    InvalidStripeKey,

    #[error("At least one exchange-rate API key is required")]
    NoRateApiKeys,

    #[error("Invalid email address for {0}")]
    InvalidEmailAddress(&'static str),
}
