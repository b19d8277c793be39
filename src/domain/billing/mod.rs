//! Billing domain - invoices, VAT treatment, refunds.

mod errors;
mod invoice;
mod vat;

pub use errors::OrderError;
pub use invoice::{BillingDetails, CreditGrant, Invoice, InvoiceStatus, RefundRecord};
pub use vat::{
    normalize_vat_number, VatTreatment, EXPORT_EXEMPT_NOTE, REVERSE_CHARGE_NOTE, STANDARD_VAT_RATE,
};
