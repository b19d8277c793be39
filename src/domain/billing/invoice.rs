//! Invoice aggregate entity.
//!
//! One invoice per purchase or manual order. The billing snapshot is
//! captured at purchase time and never rewritten by later profile edits;
//! refund sub-records are appended only during cancellation, and an
//! invoice can be cancelled exactly once.

use crate::domain::foundation::{InvoiceId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

use super::{OrderError, VatTreatment};

/// Invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Completed,
    Cancelled,
}

impl InvoiceStatus {
    /// Stable string form, used in persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Completed => "completed",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

/// One credit grant inside an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditGrant {
    /// Money paid for this grant, in cents.
    pub amount_cents: i64,

    /// Credits granted.
    pub credits: i64,

    /// When the credits were added.
    pub added_at: Timestamp,

    /// When the credits expire.
    pub expires_at: Timestamp,

    /// Why the grant exists.
    pub reason: String,

    /// True for admin-entered grants with no payment behind them.
    pub is_manual: bool,
}

/// One refund issued against an invoice. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRecord {
    /// External refund reference.
    pub refund_ref: String,

    /// Refunded amount in cents.
    pub amount_cents: i64,

    /// Cancellation reason.
    pub reason: String,

    /// When the refund was recorded.
    pub recorded_at: Timestamp,
}

/// Billing address snapshot captured at purchase time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingDetails {
    pub name: String,
    pub street: String,
    pub postal_code: String,
    pub city: String,
    /// ISO alpha-2 code (e.g. "NL").
    pub country_code: String,
    /// Full country name (e.g. "Netherlands").
    pub country_name: String,
    pub company_name: String,
    pub vat_number: Option<String>,
}

/// Invoice aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier.
    pub id: InvoiceId,

    /// Unique human-facing number, e.g. "INV-2026-0042" or "MAN-...".
    pub invoice_number: String,

    /// User the invoice belongs to.
    pub user_id: UserId,

    /// Credit grants on this invoice.
    pub credits: Vec<CreditGrant>,

    /// Subtotal in cents, excluding VAT.
    pub amount_cents: i64,

    /// VAT amount in cents.
    pub vat_cents: i64,

    /// VAT rate as a fraction (0.21 = 21%).
    pub vat_rate: f64,

    /// Whether VAT liability was reverse charged.
    pub reverse_charge: bool,

    /// Legal VAT note, if any.
    pub vat_note: String,

    /// Payment method label ("visa", "manual", "iDEAL", ...).
    pub payment_method: String,

    /// Grand total in cents: amount + VAT - discount.
    pub total_cents: i64,

    /// Invoice currency code or symbol.
    pub currency: String,

    /// External payment capture reference, when paid.
    pub payment_ref: Option<String>,

    /// Subtotal before the coupon discount, if one applied.
    pub price_before_discount_cents: Option<i64>,

    /// Coupon discount in cents.
    pub discount_cents: i64,

    /// Coupon code applied, if any.
    pub coupon_code: Option<String>,

    /// Billing snapshot. Absent for bare admin adjustments.
    pub billing: Option<BillingDetails>,

    /// Lifecycle status.
    pub status: InvoiceStatus,

    /// Admin notes / cancellation reason.
    pub notes: String,

    /// When the invoice was issued.
    pub issued_at: Timestamp,

    /// Refunds issued against this invoice. Append-only.
    pub refunds: Vec<RefundRecord>,

    /// Set once when the invoice is cancelled.
    pub cancelled_at: Option<Timestamp>,
}

impl Invoice {
    /// Creates a completed purchase invoice.
    ///
    /// Called strictly after the external payment capture succeeded and
    /// the wallet credit was applied. The total is derived here:
    /// `amount + vat - discount`.
    #[allow(clippy::too_many_arguments)]
    pub fn purchase(
        id: InvoiceId,
        invoice_number: impl Into<String>,
        user_id: UserId,
        credits: Vec<CreditGrant>,
        amount_cents: i64,
        vat: &VatTreatment,
        discount_cents: i64,
        price_before_discount_cents: Option<i64>,
        coupon_code: Option<String>,
        currency: impl Into<String>,
        payment_method: impl Into<String>,
        payment_ref: impl Into<String>,
        billing: BillingDetails,
    ) -> Self {
        let vat_cents = vat.vat_cents(amount_cents);
        Self {
            id,
            invoice_number: invoice_number.into(),
            user_id,
            credits,
            amount_cents,
            vat_cents,
            vat_rate: vat.rate,
            reverse_charge: vat.reverse_charge,
            vat_note: vat.note.clone(),
            payment_method: payment_method.into(),
            total_cents: amount_cents + vat_cents - discount_cents,
            currency: currency.into(),
            payment_ref: Some(payment_ref.into()),
            price_before_discount_cents,
            discount_cents,
            coupon_code,
            billing: Some(billing),
            status: InvoiceStatus::Completed,
            notes: String::new(),
            issued_at: Timestamp::now(),
            refunds: Vec::new(),
            cancelled_at: None,
        }
    }

    /// Creates an admin-entered manual order. No payment behind it; the
    /// wallet is credited directly by the caller.
    #[allow(clippy::too_many_arguments)]
    pub fn manual_order(
        id: InvoiceId,
        invoice_number: impl Into<String>,
        user_id: UserId,
        amount_cents: i64,
        credits: i64,
        vat: &VatTreatment,
        billing: BillingDetails,
        payment_method: impl Into<String>,
        status: InvoiceStatus,
        notes: impl Into<String>,
    ) -> Self {
        let now = Timestamp::now();
        let vat_cents = vat.vat_cents(amount_cents);
        Self {
            id,
            invoice_number: invoice_number.into(),
            user_id,
            credits: vec![CreditGrant {
                amount_cents,
                credits,
                added_at: now,
                expires_at: now.add_years(1),
                reason: "Manual order placement by admin".to_string(),
                is_manual: true,
            }],
            amount_cents,
            vat_cents,
            vat_rate: vat.rate,
            reverse_charge: vat.reverse_charge,
            vat_note: vat.note.clone(),
            payment_method: payment_method.into(),
            total_cents: amount_cents + vat_cents,
            currency: "EUR".to_string(),
            payment_ref: None,
            price_before_discount_cents: None,
            discount_cents: 0,
            coupon_code: None,
            billing: Some(billing),
            status,
            notes: notes.into(),
            issued_at: now,
            refunds: Vec::new(),
            cancelled_at: None,
        }
    }

    /// Creates a bare admin credit adjustment record (grant or removal).
    /// `credits` may be negative for removals. Carries no money and no
    /// billing snapshot; the currency is the internal "CREDITS" marker.
    pub fn manual_adjustment(
        id: InvoiceId,
        invoice_number: impl Into<String>,
        user_id: UserId,
        credits: i64,
        reason: impl Into<String>,
    ) -> Self {
        let now = Timestamp::now();
        let expires_at = if credits >= 0 { now.add_years(1) } else { now };
        Self {
            id,
            invoice_number: invoice_number.into(),
            user_id,
            credits: vec![CreditGrant {
                amount_cents: 0,
                credits,
                added_at: now,
                expires_at,
                reason: reason.into(),
                is_manual: true,
            }],
            amount_cents: 0,
            vat_cents: 0,
            vat_rate: 0.0,
            reverse_charge: false,
            vat_note: String::new(),
            payment_method: "manual".to_string(),
            total_cents: 0,
            currency: "CREDITS".to_string(),
            payment_ref: None,
            price_before_discount_cents: None,
            discount_cents: 0,
            coupon_code: None,
            billing: None,
            status: InvoiceStatus::Completed,
            notes: String::new(),
            issued_at: now,
            refunds: Vec::new(),
            cancelled_at: None,
        }
    }

    /// Cancels the invoice.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCancelled` on a second cancellation; the invoice is
    /// left untouched.
    pub fn cancel(&mut self, reason: &str, now: Timestamp) -> Result<(), OrderError> {
        if self.status == InvoiceStatus::Cancelled {
            return Err(OrderError::already_cancelled(self.id));
        }
        self.status = InvoiceStatus::Cancelled;
        self.cancelled_at = Some(now);
        if !reason.is_empty() {
            self.notes = reason.to_string();
        }
        Ok(())
    }

    /// Appends a refund record. Only called during cancellation.
    pub fn add_refund(
        &mut self,
        refund_ref: impl Into<String>,
        amount_cents: i64,
        reason: impl Into<String>,
        now: Timestamp,
    ) {
        self.refunds.push(RefundRecord {
            refund_ref: refund_ref.into(),
            amount_cents,
            reason: reason.into(),
            recorded_at: now,
        });
    }

    /// Rewrites the mutable fields of a manual order from an admin edit.
    /// The credit delta against the previous grant is the caller's to
    /// apply to the wallet.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_manual_update(
        &mut self,
        amount_cents: i64,
        credits: i64,
        vat: &VatTreatment,
        billing: BillingDetails,
        payment_method: Option<String>,
        status: Option<InvoiceStatus>,
        notes: Option<String>,
        now: Timestamp,
    ) {
        if let Some(grant) = self.credits.first_mut() {
            grant.amount_cents = amount_cents;
            grant.credits = credits;
            grant.reason = "Order updated by admin".to_string();
            grant.added_at = now;
        }

        let vat_cents = vat.vat_cents(amount_cents);
        self.amount_cents = amount_cents;
        self.vat_cents = vat_cents;
        self.vat_rate = vat.rate;
        self.reverse_charge = vat.reverse_charge;
        self.vat_note = vat.note.clone();
        self.total_cents = amount_cents + vat_cents;
        self.billing = Some(billing);

        if let Some(method) = payment_method {
            self.payment_method = method;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(notes) = notes {
            self.notes = notes;
        }
    }

    /// Total credits across all grants.
    pub fn granted_credits(&self) -> i64 {
        self.credits.iter().map(|c| c.credits).sum()
    }

    /// The first (usually only) credit grant.
    pub fn primary_grant(&self) -> Option<&CreditGrant> {
        self.credits.first()
    }

    /// Whether the invoice's originating grant was admin-entered.
    pub fn is_manual_grant(&self) -> bool {
        self.primary_grant().map_or(false, |grant| grant.is_manual)
    }
}
