//! End-to-end purchase flow over the in-memory adapters: validation,
//! VAT, capture, wallet credit, coupon redemption, and invoicing acting
//! together.

mod common;

use std::sync::Arc;

use common::{purchase_command, StubVatValidator, TestBackend};
use reelcraft_backend::application::handlers::coupons::{
    SweepExpiredCouponsHandler, ValidateCouponCommand, ValidateCouponHandler,
};
use reelcraft_backend::application::handlers::wallet::AddFundsHandler;
use reelcraft_backend::domain::billing::InvoiceStatus;
use reelcraft_backend::domain::coupon::{
    Coupon, CouponError, CouponKind, NewCoupon, Purchaser, UsageRestriction,
};
use reelcraft_backend::domain::foundation::Timestamp;
use reelcraft_backend::domain::wallet::LedgerEntryType;
use reelcraft_backend::ports::{CouponRepository, InvoiceRepository};

fn add_funds_handler(backend: &TestBackend, vat_valid: bool) -> AddFundsHandler {
    AddFundsHandler::new(
        backend.wallets.clone(),
        backend.invoices.clone(),
        backend.coupons.clone(),
        backend.payment.clone(),
        Arc::new(StubVatValidator { vat_valid }),
        backend.notifier.clone(),
        backend.locks.clone(),
    )
}

fn limited_coupon(code: &str) -> Coupon {
    Coupon::create(NewCoupon {
        code: code.to_string(),
        kind: CouponKind::Percentage,
        amount: 10,
        description: String::new(),
        usage_limit: Some(1),
        expires_at: Timestamp::now().add_days(30),
        min_cart_total_cents: 0,
        max_cart_total_cents: None,
        allow_combine: true,
        exclude_sale_items: false,
        product_restriction: vec![],
        cart_min_items: None,
        free_shipping: false,
        restriction: UsageRestriction::default(),
    })
    .expect("valid coupon")
}

#[tokio::test]
async fn purchase_produces_consistent_wallet_ledger_and_invoice() {
    let backend = TestBackend::with_carded_user().await;
    let handler = add_funds_handler(&backend, false);

    let result = handler
        .handle(purchase_command(backend.user_id))
        .await
        .expect("purchase succeeds");

    // wallet and ledger agree
    let wallet = backend.wallet().await;
    assert_eq!(wallet.balance, 100);
    assert_eq!(wallet.total_purchased, 100);
    let ledger_sum: i64 = wallet.ledger.iter().map(|e| e.credits).sum();
    assert_eq!(ledger_sum, wallet.balance);

    // the invoice is completed and references the capture
    assert_eq!(result.invoice.status, InvoiceStatus::Completed);
    assert!(result.invoice.payment_ref.is_some());
    assert_eq!(result.invoice.total_cents, 12_100); // 21% NL VAT

    // and it is the one the ledger entry points at
    assert_eq!(wallet.ledger[0].order_id, Some(result.invoice.id));

    let stored = backend
        .invoices
        .find_by_id(&result.invoice.id)
        .await
        .unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn single_use_coupon_locks_out_after_first_purchase() {
    let backend = TestBackend::with_carded_user().await;
    backend.coupons.save(&limited_coupon("ONCE10")).await.unwrap();

    let validate = ValidateCouponHandler::new(backend.coupons.clone());
    let purchaser = Purchaser {
        user_id: backend.user_id,
        email: "buyer@example.com".to_string(),
    };

    // first validate + purchase (which redeems) succeeds
    validate
        .handle(ValidateCouponCommand {
            code: "ONCE10".to_string(),
            purchaser: Some(purchaser.clone()),
        })
        .await
        .expect("first validation passes");

    let handler = add_funds_handler(&backend, false);
    let mut cmd = purchase_command(backend.user_id);
    cmd.coupon_code = Some("ONCE10".to_string());
    cmd.discount_cents = 1_000;
    handler.handle(cmd).await.expect("purchase succeeds");

    // second validation now reports the limit
    let second = validate
        .handle(ValidateCouponCommand {
            code: "ONCE10".to_string(),
            purchaser: Some(purchaser),
        })
        .await;
    assert!(matches!(second, Err(CouponError::LimitReached(_))));
}

#[tokio::test]
async fn reverse_charged_business_purchase_has_zero_vat() {
    let backend = TestBackend::with_carded_user().await;
    let handler = add_funds_handler(&backend, true);

    let mut cmd = purchase_command(backend.user_id);
    cmd.billing.vat_number = Some("NL123456789B01".to_string());
    cmd.billing.company_name = "Acme BV".to_string();

    let result = handler.handle(cmd).await.expect("purchase succeeds");

    assert!(result.invoice.reverse_charge);
    assert_eq!(result.invoice.vat_cents, 0);
    assert_eq!(result.invoice.total_cents, 10_000);
    assert!(result.invoice.vat_note.contains("Article 138"));

    let billing = result.invoice.billing.expect("billing snapshot present");
    assert_eq!(billing.vat_number.as_deref(), Some("NL123456789B01"));
}

#[tokio::test]
async fn non_eu_purchase_is_vat_exempt() {
    let backend = TestBackend::with_carded_user().await;
    let handler = add_funds_handler(&backend, false);

    let mut cmd = purchase_command(backend.user_id);
    cmd.billing.country_code = "US".to_string();
    cmd.billing.country_name = "United States".to_string();

    let result = handler.handle(cmd).await.expect("purchase succeeds");

    assert_eq!(result.invoice.vat_cents, 0);
    assert!(!result.invoice.reverse_charge);
    assert!(result.invoice.vat_note.contains("outside the EU"));
}

#[tokio::test]
async fn expiry_sweep_runs_before_validation_reflects_current_state() {
    let backend = TestBackend::with_carded_user().await;

    let mut expired = limited_coupon("STALE10");
    expired.expires_at = Timestamp::now().minus_days(2);
    backend.coupons.save(&expired).await.unwrap();

    let swept = SweepExpiredCouponsHandler::new(backend.coupons.clone())
        .handle(Timestamp::now())
        .await
        .expect("sweep runs");
    assert_eq!(swept, 1);

    let result = ValidateCouponHandler::new(backend.coupons.clone())
        .handle(ValidateCouponCommand {
            code: "STALE10".to_string(),
            purchaser: None,
        })
        .await;
    // the sweep already flipped it inactive, which wins over expiry
    assert!(matches!(result, Err(CouponError::Inactive(_))));
}

#[tokio::test]
async fn purchase_ledger_entry_records_money_received() {
    let backend = TestBackend::with_carded_user().await;
    let handler = add_funds_handler(&backend, false);

    handler
        .handle(purchase_command(backend.user_id))
        .await
        .expect("purchase succeeds");

    let wallet = backend.wallet().await;
    let entry = &wallet.ledger[0];
    assert_eq!(entry.entry_type, LedgerEntryType::Purchase);
    assert_eq!(entry.amount_cents, 12_100);
    assert!(entry.refund_ref.is_none());
}
