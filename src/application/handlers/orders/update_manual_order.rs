//! UpdateManualOrderHandler - admin edits a manual order.
//!
//! The wallet is adjusted by the credit delta only (`new - previous`),
//! not re-credited in full; this is the one path allowed to shrink
//! `total_purchased`, as an explicit admin correction.

use std::sync::Arc;

use crate::application::handlers::wallet::BillingInput;
use crate::application::wallet_locks::WalletLockMap;
use crate::domain::billing::{normalize_vat_number, BillingDetails, Invoice, InvoiceStatus, OrderError};
use crate::domain::foundation::{InvoiceId, Timestamp};
use crate::ports::{InvoiceRepository, VatValidator, WalletRepository};

use super::resolve_vat;

/// Command to update a manual order.
#[derive(Debug, Clone)]
pub struct UpdateManualOrderCommand {
    pub invoice_id: InvoiceId,
    pub amount_cents: i64,
    pub credits: i64,
    pub billing: BillingInput,
    pub payment_method: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub notes: Option<String>,
}

/// Result of the update.
#[derive(Debug, Clone)]
pub struct UpdateManualOrderResult {
    pub invoice: Invoice,
    pub wallet_balance: i64,
    /// Credit delta applied to the wallet.
    pub credits_delta: i64,
}

/// Handler for manual order edits.
pub struct UpdateManualOrderHandler {
    wallets: Arc<dyn WalletRepository>,
    invoices: Arc<dyn InvoiceRepository>,
    vat_validator: Arc<dyn VatValidator>,
    locks: Arc<WalletLockMap>,
}

impl UpdateManualOrderHandler {
    pub fn new(
        wallets: Arc<dyn WalletRepository>,
        invoices: Arc<dyn InvoiceRepository>,
        vat_validator: Arc<dyn VatValidator>,
        locks: Arc<WalletLockMap>,
    ) -> Self {
        Self {
            wallets,
            invoices,
            vat_validator,
            locks,
        }
    }

    pub async fn handle(
        &self,
        cmd: UpdateManualOrderCommand,
    ) -> Result<UpdateManualOrderResult, OrderError> {
        if cmd.amount_cents <= 0 {
            return Err(OrderError::validation("amount", "must be positive"));
        }
        if cmd.credits <= 0 {
            return Err(OrderError::validation("credits", "must be positive"));
        }

        let mut invoice = self
            .invoices
            .find_by_id(&cmd.invoice_id)
            .await?
            .ok_or_else(|| OrderError::invoice_not_found(cmd.invoice_id))?;

        let _guard = self.locks.acquire(&invoice.user_id).await;

        let mut wallet = self
            .wallets
            .find_by_user_id(&invoice.user_id)
            .await?
            .ok_or_else(|| OrderError::wallet_not_found(invoice.user_id))?;

        let vat = resolve_vat(
            self.vat_validator.as_ref(),
            &cmd.billing.country_code,
            cmd.billing.vat_number.as_deref(),
        )
        .await?;

        // Apply only the delta against the previous grant
        let previous_credits = invoice.primary_grant().map_or(0, |grant| grant.credits);
        let delta = cmd.credits - previous_credits;
        if delta != 0 {
            wallet
                .apply_admin_delta(delta, invoice.id, "Order updated by admin")
                .map_err(|e| OrderError::infrastructure(e.message()))?;
            self.wallets.update(&wallet).await?;
        }

        invoice.apply_manual_update(
            cmd.amount_cents,
            cmd.credits,
            &vat,
            BillingDetails {
                name: cmd.billing.name.clone(),
                street: cmd.billing.street.clone(),
                postal_code: cmd.billing.postal_code.clone(),
                city: cmd.billing.city.clone(),
                country_code: cmd.billing.country_code.to_uppercase(),
                country_name: cmd.billing.country_name.clone(),
                company_name: cmd.billing.company_name.clone(),
                vat_number: cmd.billing.vat_number.as_deref().map(normalize_vat_number),
            },
            cmd.payment_method,
            cmd.status,
            cmd.notes,
            Timestamp::now(),
        );
        self.invoices.update(&invoice).await?;

        Ok(UpdateManualOrderResult {
            invoice,
            wallet_balance: wallet.balance,
            credits_delta: delta,
        })
    }
}
