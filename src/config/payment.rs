//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;

fn default_capture_timeout_secs() -> u64 {
    30
}

fn default_refund_max_attempts() -> u32 {
    3
}

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentConfig {
    /// Stripe API key
    #[serde(default)]
    pub stripe_api_key: String,

    /// Per-request timeout for captures and refunds, in seconds
    #[serde(default = "default_capture_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retry bound for idempotency-keyed refunds
    #[serde(default = "default_refund_max_attempts")]
    pub refund_max_attempts: u32,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_live_")
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        Ok(())
    }
}
