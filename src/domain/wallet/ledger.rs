//! Append-only wallet ledger entries.
//!
//! Every balance mutation on a wallet is paired with exactly one ledger
//! entry whose signed `credits` delta equals the actual balance change.
//! Entries are never edited or removed after append; together they
//! reconcile the wallet balance for audit.

use crate::domain::foundation::{InvoiceId, Timestamp};
use serde::{Deserialize, Serialize};

/// Kind of balance-affecting event a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryType {
    /// Credits bought through a completed purchase or granted by an admin.
    Purchase,

    /// Credits removed by an admin or revoked for a manual-order
    /// cancellation. No money moved.
    ManualRevoke,

    /// Credits revoked alongside an external monetary refund.
    RefundAdjust,
}

impl LedgerEntryType {
    /// Stable string form, used in persistence and reporting.
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryType::Purchase => "purchase",
            LedgerEntryType::ManualRevoke => "manual_revoke",
            LedgerEntryType::RefundAdjust => "refund_adjust",
        }
    }
}

/// Immutable audit record of a single balance-affecting event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// What kind of event this records.
    pub entry_type: LedgerEntryType,

    /// Signed credit delta. Positive for purchases, negative for revokes.
    pub credits: i64,

    /// Signed monetary delta in cents. Positive for money received,
    /// negative for money refunded; zero for pure credit adjustments.
    pub amount_cents: i64,

    /// Invoice that originated this entry, if any.
    pub order_id: Option<InvoiceId>,

    /// External refund reference for `RefundAdjust` entries.
    pub refund_ref: Option<String>,

    /// Free-text note (admin reason, cancellation reason, ...).
    pub note: String,

    /// When the entry was appended.
    pub recorded_at: Timestamp,
}

impl LedgerEntry {
    /// Entry for credits bought or granted.
    pub fn purchase(
        credits: i64,
        amount_cents: i64,
        order_id: Option<InvoiceId>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            entry_type: LedgerEntryType::Purchase,
            credits,
            amount_cents,
            order_id,
            refund_ref: None,
            note: note.into(),
            recorded_at: Timestamp::now(),
        }
    }

    /// Entry for credits removed without a monetary refund.
    ///
    /// `credits_removed` is the actual number debited; stored negated.
    pub fn manual_revoke(
        credits_removed: i64,
        order_id: Option<InvoiceId>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            entry_type: LedgerEntryType::ManualRevoke,
            credits: -credits_removed,
            amount_cents: 0,
            order_id,
            refund_ref: None,
            note: note.into(),
            recorded_at: Timestamp::now(),
        }
    }

    /// Entry for credits revoked alongside an external refund.
    pub fn refund_adjust(
        credits_removed: i64,
        amount_refunded_cents: i64,
        refund_ref: impl Into<String>,
        order_id: Option<InvoiceId>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            entry_type: LedgerEntryType::RefundAdjust,
            credits: -credits_removed,
            amount_cents: -amount_refunded_cents,
            order_id,
            refund_ref: Some(refund_ref.into()),
            note: note.into(),
            recorded_at: Timestamp::now(),
        }
    }
}
