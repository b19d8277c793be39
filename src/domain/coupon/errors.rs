//! Coupon-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | Inactive | 400 |
//! | Expired | 400 |
//! | LimitReached | 400 |
//! | AuthRequired | 401 |
//! | Forbidden | 403 |
//! | Duplicate | 409 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode};

/// Coupon-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponError {
    /// Coupon code is unknown.
    NotFound(String),

    /// Coupon exists but is not active.
    Inactive(String),

    /// Coupon's expiry date has passed.
    Expired(String),

    /// Usage limit has been reached.
    LimitReached(String),

    /// The coupon is user-bound and no authenticated purchaser was supplied.
    AuthRequired,

    /// The coupon is bound to a different user's email.
    Forbidden,

    /// A coupon with this code already exists.
    Duplicate(String),

    /// Validation failed.
    ValidationFailed { field: String, message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl CouponError {
    pub fn not_found(code: impl Into<String>) -> Self {
        CouponError::NotFound(code.into())
    }

    pub fn inactive(code: impl Into<String>) -> Self {
        CouponError::Inactive(code.into())
    }

    pub fn expired(code: impl Into<String>) -> Self {
        CouponError::Expired(code.into())
    }

    pub fn limit_reached(code: impl Into<String>) -> Self {
        CouponError::LimitReached(code.into())
    }

    pub fn duplicate(code: impl Into<String>) -> Self {
        CouponError::Duplicate(code.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CouponError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        CouponError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CouponError::NotFound(_) => ErrorCode::CouponNotFound,
            CouponError::Inactive(_) => ErrorCode::CouponInactive,
            CouponError::Expired(_) => ErrorCode::CouponExpired,
            CouponError::LimitReached(_) => ErrorCode::CouponLimitReached,
            CouponError::AuthRequired => ErrorCode::Unauthorized,
            CouponError::Forbidden => ErrorCode::Forbidden,
            CouponError::Duplicate(_) => ErrorCode::DuplicateCoupon,
            CouponError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            CouponError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            CouponError::NotFound(code) => format!("Coupon not found: {}", code),
            CouponError::Inactive(_) => "Coupon is inactive".to_string(),
            CouponError::Expired(_) => "Coupon has expired".to_string(),
            CouponError::LimitReached(_) => "Coupon usage limit reached".to_string(),
            CouponError::AuthRequired => {
                "Authentication required to use this coupon".to_string()
            }
            CouponError::Forbidden => "This coupon is restricted to another user".to_string(),
            CouponError::Duplicate(code) => format!("Coupon code already exists: {}", code),
            CouponError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            CouponError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for CouponError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for CouponError {}

impl From<DomainError> for CouponError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => CouponError::ValidationFailed {
                field: err.details.get("field").cloned().unwrap_or_default(),
                message: err.message,
            },
            _ => CouponError::Infrastructure(err.message),
        }
    }
}
