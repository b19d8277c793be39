//! RevokeCreditsHandler - admin removes credits from a customer.
//!
//! Unlike cancellation debits, an admin removal larger than the balance is
//! rejected before any mutation.

use std::sync::Arc;

use crate::application::wallet_locks::WalletLockMap;
use crate::domain::billing::Invoice;
use crate::domain::foundation::{InvoiceId, Timestamp, UserId};
use crate::domain::wallet::WalletError;
use crate::ports::{InvoiceRepository, WalletRepository};

/// Command to remove credits manually.
#[derive(Debug, Clone)]
pub struct RevokeCreditsCommand {
    pub user_id: UserId,
    pub credits: i64,
    pub reason: Option<String>,
}

/// Result of a manual removal.
#[derive(Debug, Clone)]
pub struct RevokeCreditsResult {
    pub wallet_balance: i64,
    pub invoice: Invoice,
}

/// Handler for admin credit removals.
pub struct RevokeCreditsHandler {
    wallets: Arc<dyn WalletRepository>,
    invoices: Arc<dyn InvoiceRepository>,
    locks: Arc<WalletLockMap>,
}

impl RevokeCreditsHandler {
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

    pub async fn handle(
        &self,
        cmd: RevokeCreditsCommand,
    ) -> Result<RevokeCreditsResult, WalletError> {
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
            .unwrap_or_else(|| "Manual credit deduction".to_string());

        wallet.debit_manual(cmd.credits, reason.clone())?;
        self.wallets.update(&wallet).await?;

        let invoice = Invoice::manual_adjustment(
            InvoiceId::new(),
            format!("MAN-{}", Timestamp::now().as_unix_millis()),
            cmd.user_id,
            -cmd.credits,
            reason,
        );
        self.invoices.save(&invoice).await?;

        Ok(RevokeCreditsResult {
            wallet_balance: wallet.balance,
            invoice,
        })
    }
}
