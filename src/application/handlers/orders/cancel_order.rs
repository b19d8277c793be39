//! CancelOrderHandler - cancels an invoice and unwinds its credits.
//!
//! Two branches:
//! - manual grants carry no money, so cancellation just revokes the
//!   granted credits (floor at zero) and logs a `manual_revoke` entry
//! - paid orders with a refund type first execute the external refund
//!   (idempotency-keyed on the invoice id), then debit the wallet and
//!   append a `refund_adjust` entry plus an invoice refund record
//!
//! Either way the invoice transitions to `cancelled` exactly once; a
//! second cancellation is rejected before anything is touched.

use std::sync::Arc;

use crate::application::wallet_locks::WalletLockMap;
use crate::domain::billing::OrderError;
use crate::domain::foundation::{InvoiceId, Timestamp};
use crate::ports::{
    InvoiceRepository, NotificationTemplate, Notifier, PaymentProvider, Refund, WalletRepository,
};

/// How much of a paid order to refund.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundType {
    /// Cancel without any monetary refund.
    None,

    /// Refund the full invoice total and revoke all granted credits.
    Full,

    /// Refund half the total and revoke half the credits.
    Partial,
}

/// Command to cancel an order.
#[derive(Debug, Clone)]
pub struct CancelOrderCommand {
    pub invoice_id: InvoiceId,
    pub reason: String,
    pub refund: RefundType,
}

/// Result of a cancellation, for notification and display.
#[derive(Debug, Clone)]
pub struct CancelOrderResult {
    pub revoked_credits: i64,
    pub refund: Option<Refund>,
    pub wallet_balance: i64,
}

/// Handler for order cancellation.
pub struct CancelOrderHandler {
    invoices: Arc<dyn InvoiceRepository>,
    wallets: Arc<dyn WalletRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    notifier: Arc<dyn Notifier>,
    locks: Arc<WalletLockMap>,
}

impl CancelOrderHandler {
    pub fn new(
        invoices: Arc<dyn InvoiceRepository>,
        wallets: Arc<dyn WalletRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        notifier: Arc<dyn Notifier>,
        locks: Arc<WalletLockMap>,
    ) -> Self {
        Self {
            invoices,
            wallets,
            payment_provider,
            notifier,
            locks,
        }
    }

    pub async fn handle(&self, cmd: CancelOrderCommand) -> Result<CancelOrderResult, OrderError> {
        let now = Timestamp::now();

        let mut invoice = self
            .invoices
            .find_by_id(&cmd.invoice_id)
            .await?
            .ok_or_else(|| OrderError::invoice_not_found(cmd.invoice_id))?;

        // 1. Reject a second cancellation before touching anything
        if invoice.cancelled_at.is_some()
            || invoice.status == crate::domain::billing::InvoiceStatus::Cancelled
        {
            return Err(OrderError::already_cancelled(invoice.id));
        }

        // 2. Serialize against concurrent wallet mutations for this user
        let _guard = self.locks.acquire(&invoice.user_id).await;

        let mut wallet = self
            .wallets
            .find_by_user_id(&invoice.user_id)
            .await?
            .ok_or_else(|| OrderError::wallet_not_found(invoice.user_id))?;

        let mut refund: Option<Refund> = None;
        let mut revoked_credits = 0;

        if invoice.is_manual_grant() {
            // 3a. Manual grant: revoke the credits, no money moves
            let granted = invoice.granted_credits();
            revoked_credits =
                wallet.revoke_for_cancellation(granted, invoice.id, cmd.reason.clone());
        } else if cmd.refund != RefundType::None {
            // 3b. Paid order: the refund is the monetary action and runs
            //     first, keyed so a retry can't refund twice
            let payment_ref = invoice
                .payment_ref
                .clone()
                .ok_or_else(|| OrderError::missing_payment_ref(invoice.id))?;

            let granted = invoice.granted_credits();
            let (refund_cents, to_revoke) = match cmd.refund {
                RefundType::Full => (invoice.total_cents, granted),
                RefundType::Partial => (
                    ((invoice.total_cents as f64) / 2.0).round() as i64,
                    granted / 2,
                ),
                RefundType::None => unreachable!(),
            };

            let executed = self
                .payment_provider
                .refund(
                    &payment_ref,
                    refund_cents,
                    &format!("refund_{}", invoice.id),
                )
                .await
                .map_err(|e| OrderError::payment_failed(e.message))?;

            revoked_credits = wallet.adjust_for_refund(
                to_revoke,
                executed.amount_cents,
                executed.id.clone(),
                invoice.id,
                cmd.reason.clone(),
            );
            invoice.add_refund(
                executed.id.clone(),
                executed.amount_cents,
                cmd.reason.clone(),
                now,
            );
            refund = Some(executed);
        }

        // 4. Mark cancelled and persist wallet then invoice
        invoice.cancel(&cmd.reason, now)?;
        self.wallets.update(&wallet).await?;
        if let Err(err) = self.invoices.update(&invoice).await {
            tracing::error!(
                invoice_id = %invoice.id,
                refund_ref = refund.as_ref().map(|r| r.id.as_str()),
                error = %err,
                "Invoice update failed after refund; reconcile from refund reference"
            );
            return Err(err.into());
        }

        // 5. Fire-and-forget cancellation notice
        let data = serde_json::json!({
            "invoice_number": invoice.invoice_number,
            "reason": cmd.reason,
            "revoked_credits": revoked_credits,
            "refund": refund.as_ref().map(|r| serde_json::json!({
                "id": r.id,
                "amount_cents": r.amount_cents,
                "status": r.status,
            })),
            "balance": wallet.balance,
        });
        if let Err(err) = self
            .notifier
            .notify(
                &invoice.user_id.to_string(),
                NotificationTemplate::OrderCancelled,
                data,
            )
            .await
        {
            tracing::warn!(error = %err, "Cancellation notification failed");
        }

        Ok(CancelOrderResult {
            revoked_credits,
            refund,
            wallet_balance: wallet.balance,
        })
    }
}
