//! End-to-end cancellation flow: manual-order revocation, paid-order
//! refunds, and the single-cancellation guarantee, exercised through the
//! real purchase and grant handlers first.

mod common;

use std::sync::Arc;

use common::{purchase_command, StubVatValidator, TestBackend};
use reelcraft_backend::adapters::stripe::MockPaymentProvider;
use reelcraft_backend::application::handlers::orders::{
    CancelOrderCommand, CancelOrderHandler, RefundType,
};
use reelcraft_backend::application::handlers::wallet::{
    AddFundsHandler, GrantCreditsCommand, GrantCreditsHandler,
};
use reelcraft_backend::domain::billing::{Invoice, InvoiceStatus, OrderError};
use reelcraft_backend::domain::wallet::LedgerEntryType;
use reelcraft_backend::ports::InvoiceRepository;

fn cancel_handler(backend: &TestBackend) -> CancelOrderHandler {
    CancelOrderHandler::new(
        backend.invoices.clone(),
        backend.wallets.clone(),
        backend.payment.clone(),
        backend.notifier.clone(),
        backend.locks.clone(),
    )
}

async fn granted_invoice(backend: &TestBackend, credits: i64) -> Invoice {
    GrantCreditsHandler::new(
        backend.wallets.clone(),
        backend.invoices.clone(),
        backend.locks.clone(),
    )
    .handle(GrantCreditsCommand {
        user_id: backend.user_id,
        credits,
        reason: None,
    })
    .await
    .expect("grant succeeds")
    .invoice
}

async fn purchased_invoice(backend: &TestBackend) -> Invoice {
    AddFundsHandler::new(
        backend.wallets.clone(),
        backend.invoices.clone(),
        backend.coupons.clone(),
        backend.payment.clone(),
        Arc::new(StubVatValidator { vat_valid: false }),
        backend.notifier.clone(),
        backend.locks.clone(),
    )
    .handle(purchase_command(backend.user_id))
    .await
    .expect("purchase succeeds")
    .invoice
}

#[tokio::test]
async fn cancelling_manual_grant_debits_exactly_the_granted_credits() {
    let backend = TestBackend::with_carded_user().await;
    let invoice = granted_invoice(&backend, 50).await;

    let result = cancel_handler(&backend)
        .handle(CancelOrderCommand {
            invoice_id: invoice.id,
            reason: "granted in error".to_string(),
            refund: RefundType::None,
        })
        .await
        .expect("cancellation succeeds");

    assert_eq!(result.revoked_credits, 50);
    assert_eq!(result.wallet_balance, 0);
    assert!(result.refund.is_none());
    // no refund call reached the provider
    assert!(backend.payment.refunds().await.is_empty());

    let wallet = backend.wallet().await;
    let revokes: Vec<_> = wallet
        .ledger
        .iter()
        .filter(|e| e.entry_type == LedgerEntryType::ManualRevoke)
        .collect();
    assert_eq!(revokes.len(), 1);
    assert_eq!(revokes[0].credits, -50);
}

#[tokio::test]
async fn partial_refund_returns_half_money_and_half_credits() {
    let backend = TestBackend::with_carded_user().await;
    // €100 subtotal + 21% VAT = €121 total for 100 credits
    let invoice = purchased_invoice(&backend).await;

    let result = cancel_handler(&backend)
        .handle(CancelOrderCommand {
            invoice_id: invoice.id,
            reason: "only needed half".to_string(),
            refund: RefundType::Partial,
        })
        .await
        .expect("cancellation succeeds");

    assert_eq!(result.revoked_credits, 50);
    let refund = result.refund.expect("refund issued");
    assert_eq!(refund.amount_cents, 6_050); // half of €121.00

    let refunds = backend.payment.refunds().await;
    assert_eq!(refunds.len(), 1);
    assert_eq!(refunds[0].idempotency_key, format!("refund_{}", invoice.id));

    let wallet = backend.wallet().await;
    assert_eq!(wallet.balance, 50);
    let entry = wallet.ledger.last().unwrap();
    assert_eq!(entry.entry_type, LedgerEntryType::RefundAdjust);
    assert_eq!(entry.credits, -50);
    assert_eq!(entry.amount_cents, -6_050);
    assert_eq!(entry.refund_ref.as_deref(), Some(refund.id.as_str()));

    let invoice = backend
        .invoices
        .find_by_id(&invoice.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Cancelled);
    assert_eq!(invoice.refunds.len(), 1);
}

#[tokio::test]
async fn full_refund_revokes_everything() {
    let backend = TestBackend::with_carded_user().await;
    let invoice = purchased_invoice(&backend).await;

    let result = cancel_handler(&backend)
        .handle(CancelOrderCommand {
            invoice_id: invoice.id,
            reason: "changed my mind".to_string(),
            refund: RefundType::Full,
        })
        .await
        .expect("cancellation succeeds");

    assert_eq!(result.revoked_credits, 100);
    assert_eq!(result.refund.unwrap().amount_cents, 12_100);
    assert_eq!(backend.wallet().await.balance, 0);
}

#[tokio::test]
async fn second_cancellation_is_conflict_and_leaves_state_alone() {
    let backend = TestBackend::with_carded_user().await;
    let invoice = granted_invoice(&backend, 50).await;

    let cmd = CancelOrderCommand {
        invoice_id: invoice.id,
        reason: "first".to_string(),
        refund: RefundType::None,
    };
    cancel_handler(&backend).handle(cmd.clone()).await.unwrap();

    let wallet_before = backend.wallet().await;
    let result = cancel_handler(&backend).handle(cmd).await;

    assert!(matches!(result, Err(OrderError::AlreadyCancelled(_))));
    let wallet_after = backend.wallet().await;
    assert_eq!(wallet_after.balance, wallet_before.balance);
    assert_eq!(wallet_after.ledger.len(), wallet_before.ledger.len());
}

#[tokio::test]
async fn refund_failure_keeps_wallet_and_invoice_intact() {
    let backend = TestBackend::with_provider(MockPaymentProvider::failing_refund()).await;
    // purchase through a fresh working provider is not possible here, so
    // seed the invoice directly through the grant-free purchase path with
    // an external payment reference
    let invoice = {
        let handler = AddFundsHandler::new(
            backend.wallets.clone(),
            backend.invoices.clone(),
            backend.coupons.clone(),
            backend.payment.clone(),
            Arc::new(StubVatValidator { vat_valid: false }),
            backend.notifier.clone(),
            backend.locks.clone(),
        );
        let mut cmd = purchase_command(backend.user_id);
        cmd.payment =
            reelcraft_backend::application::handlers::wallet::PaymentSelection::External {
                payment_ref: "pi_external".to_string(),
                method_label: "iDEAL".to_string(),
            };
        handler.handle(cmd).await.expect("purchase succeeds").invoice
    };

    let result = cancel_handler(&backend)
        .handle(CancelOrderCommand {
            invoice_id: invoice.id,
            reason: "refund me".to_string(),
            refund: RefundType::Full,
        })
        .await;

    assert!(matches!(result, Err(OrderError::PaymentFailed { .. })));
    assert_eq!(backend.wallet().await.balance, 100);
    let invoice = backend
        .invoices
        .find_by_id(&invoice.id)
        .await
        .unwrap()
        .unwrap();
    assert_ne!(invoice.status, InvoiceStatus::Cancelled);
}
