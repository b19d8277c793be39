//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against the Stripe REST API
//! using form-encoded requests. Captures run once with a request timeout
//! and are never retried; refunds carry an `Idempotency-Key` header and
//! retry transient failures up to a configured bound.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new("sk_test_...");
//! let adapter = StripePaymentAdapter::new(config)?;
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use crate::ports::{
    Capture, CaptureRequest, CaptureStatus, Customer, PaymentError, PaymentErrorCode,
    PaymentMethodDetails, PaymentProvider, Refund,
};

/// Delay between refund retry attempts.
const REFUND_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for the Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Per-request timeout.
    request_timeout: Duration,

    /// Maximum attempts for idempotency-keyed refunds.
    refund_max_attempts: u32,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
            request_timeout: Duration::from_secs(30),
            refund_max_attempts: 3,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `STRIPE_API_KEY`.
    pub fn from_env() -> Result<Self, std::env::VarError> {
        let api_key = std::env::var("STRIPE_API_KEY")?;
        Ok(Self::new(api_key))
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

    /// Set the refund retry bound.
    pub fn with_refund_max_attempts(mut self, attempts: u32) -> Self {
        self.refund_max_attempts = attempts.max(1);
        self
    }
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    /// Create a new Stripe adapter with the given configuration.
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PaymentError::network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, http_client })
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
        idempotency_key: Option<&str>,
    ) -> Result<T, PaymentError> {
        let url = format!("{}{}", self.config.api_base_url, path);
        let mut request = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .form(params);

        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| PaymentError::network(format!("failed to read response: {}", e)))?;

        if status.is_success() {
            return serde_json::from_slice(&body).map_err(|e| {
                PaymentError::new(
                    PaymentErrorCode::Unknown,
                    format!("failed to decode Stripe response: {}", e),
                )
            });
        }

        Err(map_api_error(status, &body))
    }
}

fn map_transport_error(err: reqwest::Error) -> PaymentError {
    if err.is_timeout() {
        PaymentError::network(format!("Stripe request timed out: {}", err))
    } else {
        PaymentError::network(format!("Stripe request failed: {}", err))
    }
}

fn map_api_error(status: reqwest::StatusCode, body: &[u8]) -> PaymentError {
    let parsed: Option<StripeErrorEnvelope> = serde_json::from_slice(body).ok();
    let (code, message) = parsed
        .map(|e| (e.error.code, e.error.message))
        .unwrap_or((None, None));
    let message = message.unwrap_or_else(|| format!("Stripe returned HTTP {}", status));

    let error_code = match code.as_deref() {
        Some("authentication_required") => PaymentErrorCode::AuthenticationRequired,
        Some("card_declined") | Some("expired_card") | Some("incorrect_cvc") => {
            PaymentErrorCode::CardDeclined
        }
        Some("resource_missing") => PaymentErrorCode::NotFound,
        _ if status.as_u16() == 429 => PaymentErrorCode::RateLimitExceeded,
        _ if status.is_server_error() => PaymentErrorCode::ProviderError,
        _ => PaymentErrorCode::Unknown,
    };

    let mut error = PaymentError::new(error_code, message);
    if let Some(code) = code {
        error = error.with_provider_code(code);
    }
    error
}

fn parse_capture_status(status: &str) -> CaptureStatus {
    match status {
        "succeeded" => CaptureStatus::Succeeded,
        "requires_action" | "requires_confirmation" => CaptureStatus::RequiresAction,
        _ => CaptureStatus::Failed,
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_customer(&self, email: &str, name: &str) -> Result<Customer, PaymentError> {
        let params = vec![
            ("email".to_string(), email.to_string()),
            ("name".to_string(), name.to_string()),
        ];
        let customer: StripeCustomer = self.post_form("/v1/customers", &params, None).await?;
        Ok(Customer {
            id: customer.id,
            email: customer.email.unwrap_or_else(|| email.to_string()),
        })
    }

    async fn attach_payment_method(
        &self,
        payment_method_ref: &str,
        customer_ref: &str,
    ) -> Result<PaymentMethodDetails, PaymentError> {
        let params = vec![("customer".to_string(), customer_ref.to_string())];
        let method: StripePaymentMethod = self
            .post_form(
                &format!("/v1/payment_methods/{}/attach", payment_method_ref),
                &params,
                None,
            )
            .await?;

        let card = method.card.unwrap_or_default();
        Ok(PaymentMethodDetails {
            id: method.id,
            brand: card.brand,
            last4: card.last4,
            exp_month: card.exp_month,
            exp_year: card.exp_year,
        })
    }

    async fn set_default_payment_method(
        &self,
        customer_ref: &str,
        payment_method_ref: &str,
    ) -> Result<(), PaymentError> {
        let params = vec![(
            "invoice_settings[default_payment_method]".to_string(),
            payment_method_ref.to_string(),
        )];
        let _: StripeCustomer = self
            .post_form(&format!("/v1/customers/{}", customer_ref), &params, None)
            .await?;
        Ok(())
    }

    async fn detach_payment_method(&self, payment_method_ref: &str) -> Result<(), PaymentError> {
        let _: StripePaymentMethod = self
            .post_form(
                &format!("/v1/payment_methods/{}/detach", payment_method_ref),
                &[],
                None,
            )
            .await?;
        Ok(())
    }

    async fn capture(&self, request: CaptureRequest) -> Result<Capture, PaymentError> {
        let mut params = vec![
            ("amount".to_string(), request.amount_cents.to_string()),
            ("currency".to_string(), request.currency.to_lowercase()),
            ("customer".to_string(), request.customer_ref.clone()),
            ("payment_method".to_string(), request.payment_method_ref.clone()),
            ("off_session".to_string(), "true".to_string()),
            ("confirm".to_string(), "true".to_string()),
            ("description".to_string(), request.description.clone()),
        ];
        for (key, value) in &request.metadata {
            params.push((format!("metadata[{}]", key), value.clone()));
        }

        // One attempt only. A timeout here is surfaced as a failure rather
        // than retried, because a retry could charge the card twice.
        let intent: StripePaymentIntent =
            self.post_form("/v1/payment_intents", &params, None).await?;

        let receipt_url = intent
            .charges
            .and_then(|charges| charges.data.into_iter().next())
            .and_then(|charge| charge.receipt_url);

        Ok(Capture {
            id: intent.id,
            amount_cents: intent.amount,
            currency: intent.currency,
            status: parse_capture_status(&intent.status),
            receipt_url,
            created_at: intent.created,
        })
    }

    async fn refund(
        &self,
        payment_ref: &str,
        amount_cents: i64,
        idempotency_key: &str,
    ) -> Result<Refund, PaymentError> {
        let params = vec![
            ("payment_intent".to_string(), payment_ref.to_string()),
            ("amount".to_string(), amount_cents.to_string()),
        ];

        let mut last_error = None;
        for attempt in 1..=self.config.refund_max_attempts {
            match self
                .post_form::<StripeRefund>("/v1/refunds", &params, Some(idempotency_key))
                .await
            {
                Ok(refund) => {
                    return Ok(Refund {
                        id: refund.id,
                        amount_cents: refund.amount,
                        currency: refund.currency,
                        status: refund.status,
                    });
                }
                Err(err) if err.retryable && attempt < self.config.refund_max_attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.config.refund_max_attempts,
                        error = %err,
                        "Refund attempt failed, retrying"
                    );
                    last_error = Some(err);
                    tokio::time::sleep(REFUND_RETRY_DELAY).await;
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error
            .unwrap_or_else(|| PaymentError::provider("refund retries exhausted")))
    }
}

// Stripe wire types, kept private to the adapter.

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeCustomer {
    id: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripePaymentMethod {
    id: String,
    card: Option<StripeCard>,
}

#[derive(Debug, Default, Deserialize)]
struct StripeCard {
    #[serde(default)]
    brand: String,
    #[serde(default)]
    last4: String,
    #[serde(default)]
    exp_month: u8,
    #[serde(default)]
    exp_year: u16,
}

#[derive(Debug, Deserialize)]
struct StripePaymentIntent {
    id: String,
    amount: i64,
    currency: String,
    status: String,
    created: i64,
    charges: Option<StripeChargeList>,
}

#[derive(Debug, Deserialize)]
struct StripeChargeList {
    #[serde(default)]
    data: Vec<StripeCharge>,
}

#[derive(Debug, Deserialize)]
struct StripeCharge {
    receipt_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeRefund {
    id: String,
    amount: i64,
    currency: String,
    status: String,
}
