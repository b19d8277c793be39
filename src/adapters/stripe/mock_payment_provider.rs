//! Mock payment provider for tests and local development.
//!
//! Records every call and can be configured to fail specific operations,
//! so handler tests can assert both the happy path and what happens when
//! the provider rejects a charge.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::ports::{
    Capture, CaptureRequest, CaptureStatus, Customer, PaymentError, PaymentErrorCode,
    PaymentMethodDetails, PaymentProvider, Refund,
};

/// Recorded refund call.
#[derive(Debug, Clone)]
pub struct RecordedRefund {
    pub payment_ref: String,
    pub amount_cents: i64,
    pub idempotency_key: String,
}

/// Configurable in-memory payment provider.
#[derive(Default)]
pub struct MockPaymentProvider {
    fail_capture: Option<PaymentErrorCode>,
    fail_refund: bool,
    captures: Mutex<Vec<CaptureRequest>>,
    refunds: Mutex<Vec<RecordedRefund>>,
    counter: std::sync::atomic::AtomicU64,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every capture fails with the given error code.
    pub fn failing_capture(code: PaymentErrorCode) -> Self {
        Self {
            fail_capture: Some(code),
            ..Self::default()
        }
    }

    /// Every refund fails.
    pub fn failing_refund() -> Self {
        Self {
            fail_refund: true,
            ..Self::default()
        }
    }

    /// Capture requests seen so far.
    pub async fn captures(&self) -> Vec<CaptureRequest> {
        self.captures.lock().await.clone()
    }

    /// Refund calls seen so far.
    pub async fn refunds(&self) -> Vec<RecordedRefund> {
        self.refunds.lock().await.clone()
    }

    fn next_ref(&self, prefix: &str) -> String {
        let n = self
            .counter
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        format!("{}_{:04}", prefix, n)
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_customer(&self, email: &str, _name: &str) -> Result<Customer, PaymentError> {
        Ok(Customer {
            id: self.next_ref("cus"),
            email: email.to_string(),
        })
    }

    async fn attach_payment_method(
        &self,
        payment_method_ref: &str,
        _customer_ref: &str,
    ) -> Result<PaymentMethodDetails, PaymentError> {
        Ok(PaymentMethodDetails {
            id: payment_method_ref.to_string(),
            brand: "visa".to_string(),
            last4: "4242".to_string(),
            exp_month: 12,
            exp_year: 2030,
        })
    }

    async fn set_default_payment_method(
        &self,
        _customer_ref: &str,
        _payment_method_ref: &str,
    ) -> Result<(), PaymentError> {
        Ok(())
    }

    async fn detach_payment_method(&self, _payment_method_ref: &str) -> Result<(), PaymentError> {
        Ok(())
    }

    async fn capture(&self, request: CaptureRequest) -> Result<Capture, PaymentError> {
        if let Some(code) = self.fail_capture {
            return Err(PaymentError::new(code, "Simulated capture failure"));
        }
        let amount_cents = request.amount_cents;
        let currency = request.currency.clone();
        self.captures.lock().await.push(request);
        Ok(Capture {
            id: self.next_ref("pi"),
            amount_cents,
            currency,
            status: CaptureStatus::Succeeded,
            receipt_url: Some("https://pay.example.com/receipts/1".to_string()),
            created_at: 1_700_000_000,
        })
    }

    async fn refund(
        &self,
        payment_ref: &str,
        amount_cents: i64,
        idempotency_key: &str,
    ) -> Result<Refund, PaymentError> {
        if self.fail_refund {
            return Err(PaymentError::provider("Simulated refund failure"));
        }
        self.refunds.lock().await.push(RecordedRefund {
            payment_ref: payment_ref.to_string(),
            amount_cents,
            idempotency_key: idempotency_key.to_string(),
        });
        Ok(Refund {
            id: self.next_ref("re"),
            amount_cents,
            currency: "eur".to_string(),
            status: "succeeded".to_string(),
        })
    }
}
