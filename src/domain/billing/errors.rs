//! Order and invoice error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | InvoiceNotFound | 404 |
//! | WalletNotFound | 404 |
//! | AlreadyCancelled | 409 |
//! | MissingPaymentRef | 400 |
//! | PaymentFailed | 402 |
//! | AuthenticationRequired | 402 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, InvoiceId, UserId};

/// Order-level errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Invoice was not found.
    InvoiceNotFound(InvoiceId),

    /// No wallet exists for the invoice's user.
    WalletNotFound(UserId),

    /// The invoice has already been cancelled.
    AlreadyCancelled(InvoiceId),

    /// A refund was requested but the invoice carries no payment reference.
    MissingPaymentRef(InvoiceId),

    /// External payment or refund failed.
    PaymentFailed { reason: String },

    /// The card requires re-authentication by the cardholder.
    AuthenticationRequired,

    /// Validation failed.
    ValidationFailed { field: String, message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl OrderError {
    pub fn invoice_not_found(id: InvoiceId) -> Self {
        OrderError::InvoiceNotFound(id)
    }

    pub fn wallet_not_found(user_id: UserId) -> Self {
        OrderError::WalletNotFound(user_id)
    }

    pub fn already_cancelled(id: InvoiceId) -> Self {
        OrderError::AlreadyCancelled(id)
    }

    pub fn missing_payment_ref(id: InvoiceId) -> Self {
        OrderError::MissingPaymentRef(id)
    }

    pub fn payment_failed(reason: impl Into<String>) -> Self {
        OrderError::PaymentFailed { reason: reason.into() }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        OrderError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        OrderError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            OrderError::InvoiceNotFound(_) => ErrorCode::InvoiceNotFound,
            OrderError::WalletNotFound(_) => ErrorCode::WalletNotFound,
            OrderError::AlreadyCancelled(_) => ErrorCode::AlreadyCancelled,
            OrderError::MissingPaymentRef(_) => ErrorCode::ValidationFailed,
            OrderError::PaymentFailed { .. } => ErrorCode::PaymentFailed,
            OrderError::AuthenticationRequired => ErrorCode::AuthenticationRequired,
            OrderError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            OrderError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            OrderError::InvoiceNotFound(id) => format!("Invoice not found: {}", id),
            OrderError::WalletNotFound(user_id) => {
                format!("Wallet not found for user: {}", user_id)
            }
            OrderError::AlreadyCancelled(_) => {
                "This order has already been cancelled.".to_string()
            }
            OrderError::MissingPaymentRef(_) => {
                "No payment reference found for refund.".to_string()
            }
            OrderError::PaymentFailed { reason } => format!("Payment failed: {}", reason),
            OrderError::AuthenticationRequired => {
                "Authentication required for card. Please re-authenticate.".to_string()
            }
            OrderError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            OrderError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for OrderError {}

impl From<DomainError> for OrderError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => OrderError::ValidationFailed {
                field: err.details.get("field").cloned().unwrap_or_default(),
                message: err.message,
            },
            _ => OrderError::Infrastructure(err.message),
        }
    }
}
