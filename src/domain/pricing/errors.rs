//! Pricing-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode, ProductId};

/// Pricing and schedule errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Product was not found.
    ProductNotFound(ProductId),

    /// Schedule index out of range for the product.
    InvalidScheduleIndex { index: usize, len: usize },

    /// The requested currency has no known conversion rate.
    UnsupportedCurrency(String),

    /// Validation failed.
    ValidationFailed { field: String, message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl PricingError {
    pub fn product_not_found(id: ProductId) -> Self {
        PricingError::ProductNotFound(id)
    }

    pub fn invalid_schedule_index(index: usize, len: usize) -> Self {
        PricingError::InvalidScheduleIndex { index, len }
    }

    pub fn unsupported_currency(currency: impl Into<String>) -> Self {
        PricingError::UnsupportedCurrency(currency.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PricingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        PricingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PricingError::ProductNotFound(_) => ErrorCode::ProductNotFound,
            PricingError::InvalidScheduleIndex { .. } => ErrorCode::ValidationFailed,
            PricingError::UnsupportedCurrency(_) => ErrorCode::ValidationFailed,
            PricingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            PricingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            PricingError::ProductNotFound(id) => format!("Product not found: {}", id),
            PricingError::InvalidScheduleIndex { index, len } => {
                format!("Invalid schedule index {} (product has {})", index, len)
            }
            PricingError::UnsupportedCurrency(currency) => {
                format!("Unsupported currency: {}", currency)
            }
            PricingError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            PricingError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for PricingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for PricingError {}

impl From<DomainError> for PricingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::UpstreamUnavailable => PricingError::Infrastructure(err.message),
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => PricingError::ValidationFailed {
                field: err.details.get("field").cloned().unwrap_or_default(),
                message: err.message,
            },
            _ => PricingError::Infrastructure(err.message),
        }
    }
}
