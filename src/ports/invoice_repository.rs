//! Invoice persistence port.

use async_trait::async_trait;

use crate::domain::billing::Invoice;
use crate::domain::foundation::{DomainError, InvoiceId, UserId};

/// Port for invoice persistence and invoice-number sequencing.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Persist a new invoice.
    async fn save(&self, invoice: &Invoice) -> Result<(), DomainError>;

    /// Persist changes to an existing invoice.
    async fn update(&self, invoice: &Invoice) -> Result<(), DomainError>;

    /// Find an invoice by its id.
    async fn find_by_id(&self, id: &InvoiceId) -> Result<Option<Invoice>, DomainError>;

    /// All invoices for a user, newest first.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Invoice>, DomainError>;

    /// All invoices, newest first, for admin reporting.
    async fn find_all(&self) -> Result<Vec<Invoice>, DomainError>;

    /// Next number in the sequential invoice series (e.g. "INV-2026-0042").
    /// Manual adjustments use timestamped "MAN-" numbers and bypass this.
    async fn next_invoice_number(&self) -> Result<String, DomainError>;
}
