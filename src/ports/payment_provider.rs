//! Payment provider port for external payment processing.
//!
//! Defines the contract for payment gateway integrations (e.g., Stripe).
//! Implementations handle customer management, saved payment methods,
//! off-session captures, and refunds.
//!
//! # Design
//!
//! - **Gateway agnostic**: Interface works with any payment provider
//! - **Capture is final**: a capture is attempted once and never retried,
//!   so a timeout can't double-charge
//! - **Refunds are idempotent**: every refund carries an idempotency key
//!   derived from the invoice and may be safely retried

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Port for payment provider integrations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a customer in the payment system.
    ///
    /// Returns the provider's customer reference for future charges.
    async fn create_customer(&self, email: &str, name: &str) -> Result<Customer, PaymentError>;

    /// Attach a payment method to a customer.
    async fn attach_payment_method(
        &self,
        payment_method_ref: &str,
        customer_ref: &str,
    ) -> Result<PaymentMethodDetails, PaymentError>;

    /// Make a payment method the customer's default for off-session charges.
    async fn set_default_payment_method(
        &self,
        customer_ref: &str,
        payment_method_ref: &str,
    ) -> Result<(), PaymentError>;

    /// Detach a payment method from its customer.
    async fn detach_payment_method(&self, payment_method_ref: &str) -> Result<(), PaymentError>;

    /// Capture a payment off-session against a saved payment method.
    ///
    /// Implementations must not retry: the caller treats any failure as
    /// final to avoid double charging.
    async fn capture(&self, request: CaptureRequest) -> Result<Capture, PaymentError>;

    /// Refund a previous capture.
    ///
    /// `idempotency_key` makes retries safe; implementations may retry
    /// transient failures internally.
    async fn refund(
        &self,
        payment_ref: &str,
        amount_cents: i64,
        idempotency_key: &str,
    ) -> Result<Refund, PaymentError>;
}

/// Customer in the payment system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Provider's customer reference.
    pub id: String,

    /// Customer email.
    pub email: String,
}

/// Saved payment method as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethodDetails {
    /// Provider's payment-method reference.
    pub id: String,

    /// Card brand (e.g. "visa").
    pub brand: String,

    /// Last four digits.
    pub last4: String,

    /// Expiry month (1-12).
    pub exp_month: u8,

    /// Expiry year (four digits).
    pub exp_year: u16,
}

/// Request to capture a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureRequest {
    /// Amount in the currency's smallest unit (cents).
    pub amount_cents: i64,

    /// Lowercase ISO currency code (e.g. "eur").
    pub currency: String,

    /// Provider's customer reference.
    pub customer_ref: String,

    /// Payment method to charge.
    pub payment_method_ref: String,

    /// Statement / dashboard description.
    pub description: String,

    /// Free-form metadata recorded with the charge.
    pub metadata: HashMap<String, String>,
}

/// Result of a successful capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capture {
    /// Provider's capture reference (e.g. a payment intent id).
    pub id: String,

    /// Captured amount in cents.
    pub amount_cents: i64,

    /// Currency the charge settled in.
    pub currency: String,

    /// Capture status.
    pub status: CaptureStatus,

    /// Receipt URL, when the provider exposes one.
    pub receipt_url: Option<String>,

    /// Provider timestamp (Unix seconds).
    pub created_at: i64,
}

/// Status of a capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStatus {
    /// The charge settled.
    Succeeded,

    /// The cardholder must authenticate before the charge can settle.
    RequiresAction,

    /// The charge was rejected.
    Failed,
}

/// Result of a refund.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    /// Provider's refund reference.
    pub id: String,

    /// Refunded amount in cents.
    pub amount_cents: i64,

    /// Currency the refund settled in.
    pub currency: String,

    /// Provider-reported status (e.g. "succeeded", "pending").
    pub status: String,
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Attach the provider's own error code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    /// Create a card re-authentication error.
    pub fn authentication_required(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationRequired, message)
    }

    /// Create a card declined error.
    pub fn card_declined(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::CardDeclined, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(PaymentErrorCode::NotFound, format!("{} not found", resource))
    }

    /// Create a provider-side error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        let code = match err.code {
            PaymentErrorCode::AuthenticationRequired => ErrorCode::AuthenticationRequired,
            PaymentErrorCode::NotFound => ErrorCode::InvoiceNotFound,
            _ => ErrorCode::PaymentFailed,
        };
        DomainError::new(code, err.message)
    }
}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue or timeout.
    NetworkError,

    /// The cardholder must re-authenticate the saved card.
    AuthenticationRequired,

    /// Card was declined.
    CardDeclined,

    /// Resource not found at the provider.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Provider API error.
    ProviderError,

    /// Unknown error.
    Unknown,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    ///
    /// Only meaningful for idempotency-keyed operations (refunds);
    /// captures are never retried regardless.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError
                | PaymentErrorCode::RateLimitExceeded
                | PaymentErrorCode::ProviderError
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationRequired => "authentication_required",
            PaymentErrorCode::CardDeclined => "card_declined",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::ProviderError => "provider_error",
            PaymentErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}
