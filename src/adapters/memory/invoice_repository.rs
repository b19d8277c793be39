//! In-memory implementation of InvoiceRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::domain::billing::Invoice;
use crate::domain::foundation::{DomainError, ErrorCode, InvoiceId, Timestamp, UserId};
use crate::ports::InvoiceRepository;

/// In-memory invoice store for tests and local development.
#[derive(Default)]
pub struct InMemoryInvoiceRepository {
    invoices: RwLock<HashMap<InvoiceId, Invoice>>,
    sequence: AtomicU64,
}

impl InMemoryInvoiceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
    async fn save(&self, invoice: &Invoice) -> Result<(), DomainError> {
        let mut invoices = self.invoices.write().await;
        if invoices.contains_key(&invoice.id) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Invoice already exists",
            ));
        }
        invoices.insert(invoice.id, invoice.clone());
        Ok(())
    }

    async fn update(&self, invoice: &Invoice) -> Result<(), DomainError> {
        let mut invoices = self.invoices.write().await;
        if !invoices.contains_key(&invoice.id) {
            return Err(DomainError::new(ErrorCode::InvoiceNotFound, "Invoice not found"));
        }
        invoices.insert(invoice.id, invoice.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &InvoiceId) -> Result<Option<Invoice>, DomainError> {
        Ok(self.invoices.read().await.get(id).cloned())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Invoice>, DomainError> {
        let mut invoices: Vec<Invoice> = self
            .invoices
            .read()
            .await
            .values()
            .filter(|inv| &inv.user_id == user_id)
            .cloned()
            .collect();
        invoices.sort_by_key(|inv| std::cmp::Reverse(inv.issued_at));
        Ok(invoices)
    }

    async fn find_all(&self) -> Result<Vec<Invoice>, DomainError> {
        let mut invoices: Vec<Invoice> = self.invoices.read().await.values().cloned().collect();
        invoices.sort_by_key(|inv| std::cmp::Reverse(inv.issued_at));
        Ok(invoices)
    }

    async fn next_invoice_number(&self) -> Result<String, DomainError> {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("INV-{}-{:04}", Timestamp::now().year(), seq))
    }
}
