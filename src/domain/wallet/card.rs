//! Saved payment method references.

use crate::domain::foundation::Timestamp;
use serde::{Deserialize, Serialize};

/// A saved card on a wallet, referencing a payment method held by the
/// external payment provider. At most one card per wallet is primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCard {
    /// Payment provider's payment-method reference.
    pub payment_method_ref: String,

    /// Card brand as reported by the provider (e.g. "visa").
    pub brand: String,

    /// Last four digits for display.
    pub last4: String,

    /// Expiry month (1-12).
    pub exp_month: u8,

    /// Expiry year (four digits).
    pub exp_year: u16,

    /// Whether this is the default card for off-session charges.
    pub is_primary: bool,

    /// When the card was saved.
    pub added_at: Timestamp,
}

impl SavedCard {
    pub fn new(
        payment_method_ref: impl Into<String>,
        brand: impl Into<String>,
        last4: impl Into<String>,
        exp_month: u8,
        exp_year: u16,
    ) -> Self {
        Self {
            payment_method_ref: payment_method_ref.into(),
            brand: brand.into(),
            last4: last4.into(),
            exp_month,
            exp_year,
            is_primary: false,
            added_at: Timestamp::now(),
        }
    }
}
