//! GetCreditOverviewHandler - admin report of every customer's credits.
//!
//! Read-only composition of wallets and invoices: remaining balance,
//! lifetime purchases, usage percentage, and the latest credit expiry.
//! Customers with no credit activity at all are filtered out.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::wallet::WalletError;
use crate::ports::{InvoiceRepository, WalletRepository};

/// One customer's credit standing.
#[derive(Debug, Clone)]
pub struct CustomerCredits {
    pub user_id: UserId,
    pub remaining: i64,
    pub total_purchased: i64,
    pub used: i64,
    pub usage_percent: u32,
    /// Latest expiry across the customer's credit grants.
    pub expires_at: Option<Timestamp>,
    /// Whether the customer still has usable credits.
    pub active: bool,
}

/// Handler for the customer credits report.
pub struct GetCreditOverviewHandler {
    wallets: Arc<dyn WalletRepository>,
    invoices: Arc<dyn InvoiceRepository>,
}

impl GetCreditOverviewHandler {
    pub fn new(wallets: Arc<dyn WalletRepository>, invoices: Arc<dyn InvoiceRepository>) -> Self {
        Self { wallets, invoices }
    }

    pub async fn handle(&self) -> Result<Vec<CustomerCredits>, WalletError> {
        let wallets = self.wallets.find_all().await?;
        let invoices = self.invoices.find_all().await?;

        let mut report = Vec::new();
        for wallet in wallets {
            if wallet.balance == 0 && wallet.total_purchased == 0 {
                continue;
            }

            let expires_at = invoices
                .iter()
                .filter(|inv| inv.user_id == wallet.user_id)
                .flat_map(|inv| inv.credits.iter())
                .map(|grant| grant.expires_at)
                .max();

            report.push(CustomerCredits {
                user_id: wallet.user_id,
                remaining: wallet.balance,
                total_purchased: wallet.total_purchased,
                used: wallet.used_credits(),
                usage_percent: wallet.usage_percent(),
                expires_at,
                active: wallet.balance > 0,
            });
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryInvoiceRepository, InMemoryWalletRepository};
    use crate::domain::billing::Invoice;
    use crate::domain::foundation::{InvoiceId, WalletId};
    use crate::domain::wallet::Wallet;

    #[tokio::test]
    async fn report_skips_customers_without_any_credits() {
        let wallets = Arc::new(InMemoryWalletRepository::new());
        let invoices = Arc::new(InMemoryInvoiceRepository::new());

        let active_user = UserId::new();
        let mut funded = Wallet::new(WalletId::new(), active_user);
        funded.credit(100, 10_000, None, "seed").unwrap();
        wallets.save(&funded).await.unwrap();
        wallets
            .save(&Wallet::new(WalletId::new(), UserId::new()))
            .await
            .unwrap();

        let report = GetCreditOverviewHandler::new(wallets, invoices)
            .handle()
            .await
            .unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].user_id, active_user);
        assert_eq!(report[0].remaining, 100);
        assert!(report[0].active);
    }

    #[tokio::test]
    async fn expiry_is_latest_grant_expiry() {
        let wallets = Arc::new(InMemoryWalletRepository::new());
        let invoices = Arc::new(InMemoryInvoiceRepository::new());

        let user_id = UserId::new();
        let mut wallet = Wallet::new(WalletId::new(), user_id);
        wallet.credit(50, 0, None, "seed").unwrap();
        wallets.save(&wallet).await.unwrap();

        let invoice =
            Invoice::manual_adjustment(InvoiceId::new(), "MAN-1", user_id, 50, "grant");
        let expected_expiry = invoice.credits[0].expires_at;
        invoices.save(&invoice).await.unwrap();

        let report = GetCreditOverviewHandler::new(wallets, invoices)
            .handle()
            .await
            .unwrap();

        assert_eq!(report[0].expires_at, Some(expected_expiry));
    }
}
