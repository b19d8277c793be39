//! GrantCreditsHandler - admin grants credits to a customer.
//!
//! Bypasses payment entirely: the wallet is credited and a zero-amount
//! "MAN-" invoice records the grant for the audit trail.

use std::sync::Arc;

use crate::application::wallet_locks::WalletLockMap;
use crate::domain::billing::Invoice;
use crate::domain::foundation::{InvoiceId, Timestamp, UserId};
use crate::domain::wallet::WalletError;
use crate::ports::{InvoiceRepository, WalletRepository};

/// Command to grant credits manually.
#[derive(Debug, Clone)]
pub struct GrantCreditsCommand {
    pub user_id: UserId,
    pub credits: i64,
    pub reason: Option<String>,
}

/// Result of a manual grant.
#[derive(Debug, Clone)]
pub struct GrantCreditsResult {
    pub wallet_balance: i64,
    pub invoice: Invoice,
}

/// Handler for admin credit grants.
pub struct GrantCreditsHandler {
    wallets: Arc<dyn WalletRepository>,
    invoices: Arc<dyn InvoiceRepository>,
    locks: Arc<WalletLockMap>,
}

impl GrantCreditsHandler {
    pub fn new(
        wallets: Arc<dyn WalletRepository>,
        invoices: Arc<dyn InvoiceRepository>,
        locks: Arc<WalletLockMap>,
    ) -> Self {
        Self {
            wallets,
            invoices,
            locks,
        }
    }

    pub async fn handle(&self, cmd: GrantCreditsCommand) -> Result<GrantCreditsResult, WalletError> {
        if cmd.credits <= 0 {
            return Err(WalletError::validation("credits", "must be positive"));
        }

        let _guard = self.locks.acquire(&cmd.user_id).await;

        let mut wallet = self
            .wallets
            .find_by_user_id(&cmd.user_id)
            .await?
            .ok_or_else(|| WalletError::not_found(cmd.user_id))?;

        let reason = cmd
            .reason
            .unwrap_or_else(|| "Manual credit addition".to_string());
        let invoice_id = InvoiceId::new();

        wallet.credit(cmd.credits, 0, Some(invoice_id), reason.clone())?;
        self.wallets.update(&wallet).await?;

        let invoice = Invoice::manual_adjustment(
            invoice_id,
            format!("MAN-{}", Timestamp::now().as_unix_millis()),
            cmd.user_id,
            cmd.credits,
            reason,
        );
        self.invoices.save(&invoice).await?;

        Ok(GrantCreditsResult {
            wallet_balance: wallet.balance,
            invoice,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryInvoiceRepository, InMemoryWalletRepository};
    use crate::domain::foundation::WalletId;
    use crate::domain::wallet::{LedgerEntryType, Wallet};

    fn handler(
        wallets: Arc<InMemoryWalletRepository>,
        invoices: Arc<InMemoryInvoiceRepository>,
    ) -> GrantCreditsHandler {
        GrantCreditsHandler::new(wallets, invoices, Arc::new(WalletLockMap::new()))
    }

    #[tokio::test]
    async fn grant_credits_updates_wallet_and_writes_manual_invoice() {
        let wallets = Arc::new(InMemoryWalletRepository::new());
        let invoices = Arc::new(InMemoryInvoiceRepository::new());
        let user_id = UserId::new();
        wallets
            .save(&Wallet::new(WalletId::new(), user_id))
            .await
            .unwrap();

        let result = handler(wallets.clone(), invoices.clone())
            .handle(GrantCreditsCommand {
                user_id,
                credits: 75,
                reason: None,
            })
            .await
            .unwrap();

        assert_eq!(result.wallet_balance, 75);
        assert!(result.invoice.invoice_number.starts_with("MAN-"));
        assert!(result.invoice.is_manual_grant());

        let wallet = wallets.find_by_user_id(&user_id).await.unwrap().unwrap();
        assert_eq!(wallet.total_purchased, 75);
        assert_eq!(wallet.ledger.len(), 1);
        assert_eq!(wallet.ledger[0].entry_type, LedgerEntryType::Purchase);
        assert_eq!(wallet.ledger[0].order_id, Some(result.invoice.id));

        assert_eq!(invoices.find_by_user(&user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn zero_credits_are_rejected() {
        let wallets = Arc::new(InMemoryWalletRepository::new());
        let invoices = Arc::new(InMemoryInvoiceRepository::new());

        let result = handler(wallets, invoices)
            .handle(GrantCreditsCommand {
                user_id: UserId::new(),
                credits: 0,
                reason: None,
            })
            .await;

        assert!(matches!(result, Err(WalletError::ValidationFailed { .. })));
    }
}
