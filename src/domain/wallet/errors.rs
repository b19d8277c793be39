//! Wallet-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | CardNotFound | 404 |
//! | DuplicateCard | 409 |
//! | InsufficientCredits | 400 |
//! | PaymentFailed | 402 |
//! | AuthenticationRequired | 402 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, UserId};

/// Wallet-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No wallet exists for this user.
    NotFound(UserId),

    /// Referenced card is not saved on the wallet.
    CardNotFound(String),

    /// The payment method is already saved on the wallet.
    DuplicateCard(String),

    /// An admin debit exceeds the current balance.
    InsufficientCredits { requested: i64, available: i64 },

    /// External payment capture failed.
    PaymentFailed { reason: String },

    /// The card requires re-authentication by the cardholder.
    AuthenticationRequired,

    /// Validation failed.
    ValidationFailed { field: String, message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl WalletError {
    pub fn not_found(user_id: UserId) -> Self {
        WalletError::NotFound(user_id)
    }

    pub fn card_not_found(card_ref: impl Into<String>) -> Self {
        WalletError::CardNotFound(card_ref.into())
    }

    pub fn duplicate_card(card_ref: impl Into<String>) -> Self {
        WalletError::DuplicateCard(card_ref.into())
    }

    pub fn insufficient_credits(requested: i64, available: i64) -> Self {
        WalletError::InsufficientCredits { requested, available }
    }

    pub fn payment_failed(reason: impl Into<String>) -> Self {
        WalletError::PaymentFailed { reason: reason.into() }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        WalletError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        WalletError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            WalletError::NotFound(_) => ErrorCode::WalletNotFound,
            WalletError::CardNotFound(_) => ErrorCode::CardNotFound,
            WalletError::DuplicateCard(_) => ErrorCode::DuplicateCard,
            WalletError::InsufficientCredits { .. } => ErrorCode::InsufficientCredits,
            WalletError::PaymentFailed { .. } => ErrorCode::PaymentFailed,
            WalletError::AuthenticationRequired => ErrorCode::AuthenticationRequired,
            WalletError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            WalletError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            WalletError::NotFound(user_id) => format!("Wallet not found for user: {}", user_id),
            WalletError::CardNotFound(card_ref) => format!("Card not found: {}", card_ref),
            WalletError::DuplicateCard(_) => "Card already added".to_string(),
            WalletError::InsufficientCredits { requested, available } => format!(
                "Insufficient credits: requested {}, available {}",
                requested, available
            ),
            WalletError::PaymentFailed { reason } => format!("Payment failed: {}", reason),
            WalletError::AuthenticationRequired => {
                "Authentication required for card. Please re-authenticate.".to_string()
            }
            WalletError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            WalletError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for WalletError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for WalletError {}

impl From<DomainError> for WalletError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => WalletError::ValidationFailed {
                field: err.details.get("field").cloned().unwrap_or_default(),
                message: err.message,
            },
            _ => WalletError::Infrastructure(err.message),
        }
    }
}
