//! AddFundsHandler - Command handler for the wallet top-up purchase flow.
//!
//! Ordering matters here: all validation runs before any external call,
//! the payment capture is the single monetary action and happens first,
//! and only then do the local writes follow in a fixed order (wallet,
//! coupon, invoice). If a local write fails after capture, the payment
//! reference in the logs is the reconciliation anchor; the capture is
//! never re-executed.

use std::sync::Arc;

use crate::application::wallet_locks::WalletLockMap;
use crate::domain::billing::{normalize_vat_number, BillingDetails, CreditGrant, Invoice, VatTreatment};
use crate::domain::coupon::{Coupon, CouponError, Purchaser};
use crate::domain::foundation::{InvoiceId, Timestamp, UserId};
use crate::domain::wallet::WalletError;
use crate::ports::{
    Capture, CaptureRequest, CaptureStatus, CouponRepository, InvoiceRepository,
    NotificationTemplate, Notifier, PaymentErrorCode, PaymentProvider, VatValidator,
    WalletRepository,
};

/// Billing address fields supplied with a purchase.
#[derive(Debug, Clone)]
pub struct BillingInput {
    pub name: String,
    pub street: String,
    pub postal_code: String,
    pub city: String,
    /// ISO alpha-2 code, resolved by the caller.
    pub country_code: String,
    pub country_name: String,
    pub company_name: String,
    pub vat_number: Option<String>,
}

/// How the purchase is paid.
#[derive(Debug, Clone)]
pub enum PaymentSelection {
    /// Charge the wallet's primary saved card off-session.
    PrimaryCard,

    /// Charge the most recently saved card off-session.
    LatestCard,

    /// Payment was already confirmed externally (hosted checkout, local
    /// payment methods); trust the supplied reference.
    External {
        payment_ref: String,
        method_label: String,
    },
}

/// One purchased credit line.
#[derive(Debug, Clone)]
pub struct CreditLine {
    pub amount_cents: i64,
    pub credits: i64,
}

/// Command to add purchased credits to a wallet.
#[derive(Debug, Clone)]
pub struct AddFundsCommand {
    pub user_id: UserId,
    pub email: String,
    /// Subtotal in cents, excluding VAT.
    pub amount_cents: i64,
    /// Coupon discount in cents.
    pub discount_cents: i64,
    /// Subtotal before the discount, when a coupon applied.
    pub price_before_discount_cents: Option<i64>,
    /// Invoice/charge currency code (e.g. "EUR").
    pub currency: String,
    pub billing: BillingInput,
    pub credits: Vec<CreditLine>,
    pub coupon_code: Option<String>,
    pub payment: PaymentSelection,
}

/// Result of a successful top-up.
#[derive(Debug, Clone)]
pub struct AddFundsResult {
    pub wallet_balance: i64,
    pub invoice: Invoice,
    pub capture: Option<Capture>,
}

/// Handler for the purchase flow.
pub struct AddFundsHandler {
    wallets: Arc<dyn WalletRepository>,
    invoices: Arc<dyn InvoiceRepository>,
    coupons: Arc<dyn CouponRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    vat_validator: Arc<dyn VatValidator>,
    notifier: Arc<dyn Notifier>,
    locks: Arc<WalletLockMap>,
}

impl AddFundsHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        wallets: Arc<dyn WalletRepository>,
        invoices: Arc<dyn InvoiceRepository>,
        coupons: Arc<dyn CouponRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        vat_validator: Arc<dyn VatValidator>,
        notifier: Arc<dyn Notifier>,
        locks: Arc<WalletLockMap>,
    ) -> Self {
        Self {
            wallets,
            invoices,
            coupons,
            payment_provider,
            vat_validator,
            notifier,
            locks,
        }
    }

    pub async fn handle(&self, cmd: AddFundsCommand) -> Result<AddFundsResult, WalletError> {
        // 1. Reject invalid input before any external call or write
        validate(&cmd)?;
        let now = Timestamp::now();

        // 2. Resolve and validate the coupon (usage is consumed later,
        //    after payment, so a failed charge doesn't burn it)
        let coupon = match &cmd.coupon_code {
            Some(code) => Some(self.resolve_coupon(code, &cmd, now).await?),
            None => None,
        };

        // 3. Serialize wallet mutations for this user
        let _guard = self.locks.acquire(&cmd.user_id).await;

        let mut wallet = self
            .wallets
            .find_by_user_id(&cmd.user_id)
            .await?
            .ok_or_else(|| WalletError::not_found(cmd.user_id))?;

        // 4. VAT treatment
        let vat = self.determine_vat(&cmd.billing).await?;
        let vat_cents = vat.vat_cents(cmd.amount_cents);
        let total_cents = cmd.amount_cents + vat_cents - cmd.discount_cents;
        let total_credits: i64 = cmd.credits.iter().map(|line| line.credits).sum();

        // 5. Capture the payment - the one monetary action, attempted once
        let (payment_ref, method_label, capture) = self
            .execute_payment(&cmd, &wallet, &vat, total_cents, total_credits)
            .await?;

        // 6. Credit the wallet and append the purchase ledger entry
        let invoice_id = InvoiceId::new();
        wallet.credit(
            total_credits,
            total_cents,
            Some(invoice_id),
            "Wallet top-up purchase",
        )?;
        if let Err(err) = self.wallets.update(&wallet).await {
            tracing::error!(
                %payment_ref,
                user_id = %cmd.user_id,
                error = %err,
                "Wallet update failed after capture; reconcile from payment reference"
            );
            return Err(err.into());
        }

        // 7. Consume the coupon now that the purchase went through
        if let Some(mut coupon) = coupon {
            coupon.redeem(cmd.user_id, cmd.email.clone(), now);
            if let Err(err) = self.coupons.update(&coupon).await {
                tracing::warn!(
                    %payment_ref,
                    coupon = %coupon.code,
                    error = %err,
                    "Coupon redemption write failed; usage count needs reconciliation"
                );
            }
        }

        // 8. Persist the invoice
        let invoice_number = self.invoices.next_invoice_number().await?;
        let grants = cmd
            .credits
            .iter()
            .map(|line| CreditGrant {
                amount_cents: line.amount_cents,
                credits: line.credits,
                added_at: now,
                expires_at: now.add_years(1),
                reason: "Wallet top-up purchase".to_string(),
                is_manual: false,
            })
            .collect();
        let invoice = Invoice::purchase(
            invoice_id,
            invoice_number,
            cmd.user_id,
            grants,
            cmd.amount_cents,
            &vat,
            cmd.discount_cents,
            cmd.price_before_discount_cents,
            cmd.coupon_code.clone(),
            cmd.currency.clone(),
            method_label,
            payment_ref.clone(),
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
        );
        if let Err(err) = self.invoices.save(&invoice).await {
            tracing::error!(
                %payment_ref,
                user_id = %cmd.user_id,
                error = %err,
                "Invoice write failed after capture; reconcile from payment reference"
            );
            return Err(err.into());
        }

        // 9. Fire-and-forget notification
        let data = serde_json::json!({
            "invoice_number": invoice.invoice_number,
            "credits": total_credits,
            "total_cents": total_cents,
            "currency": invoice.currency,
            "balance": wallet.balance,
        });
        if let Err(err) = self
            .notifier
            .notify(&cmd.email, NotificationTemplate::FundsAdded, data)
            .await
        {
            tracing::warn!(error = %err, "Funds-added notification failed");
        }

        Ok(AddFundsResult {
            wallet_balance: wallet.balance,
            invoice,
            capture,
        })
    }

    async fn resolve_coupon(
        &self,
        code: &str,
        cmd: &AddFundsCommand,
        now: Timestamp,
    ) -> Result<Coupon, WalletError> {
        let coupon = self
            .coupons
            .find_by_code(code)
            .await?
            .ok_or_else(|| WalletError::validation("coupon", format!("Coupon not found: {}", code)))?;

        let purchaser = Purchaser {
            user_id: cmd.user_id,
            email: cmd.email.clone(),
        };
        coupon
            .validate_for(Some(&purchaser), now)
            .map_err(|err| match err {
                CouponError::Infrastructure(msg) => WalletError::infrastructure(msg),
                other => WalletError::validation("coupon", other.message()),
            })?;

        Ok(coupon)
    }

    async fn determine_vat(&self, billing: &BillingInput) -> Result<VatTreatment, WalletError> {
        let country_code = billing.country_code.to_uppercase();
        let is_eu = self.vat_validator.is_eu_country(&country_code);
        let vat_number = billing.vat_number.as_deref().map(normalize_vat_number);

        let vat_valid = match (&vat_number, is_eu) {
            (Some(number), true) => self
                .vat_validator
                .validate_vat_number(number, &country_code)
                .await
                .map_err(|err| WalletError::infrastructure(err.message))?,
            _ => false,
        };

        Ok(VatTreatment::determine(is_eu, vat_number.is_some(), vat_valid))
    }

    async fn execute_payment(
        &self,
        cmd: &AddFundsCommand,
        wallet: &crate::domain::wallet::Wallet,
        vat: &VatTreatment,
        total_cents: i64,
        total_credits: i64,
    ) -> Result<(String, String, Option<Capture>), WalletError> {
        let card = match &cmd.payment {
            PaymentSelection::PrimaryCard => wallet
                .primary_card()
                .ok_or_else(|| WalletError::validation("payment", "no primary card on wallet"))?,
            PaymentSelection::LatestCard => wallet
                .latest_card()
                .ok_or_else(|| WalletError::validation("payment", "no saved card on wallet"))?,
            PaymentSelection::External {
                payment_ref,
                method_label,
            } => {
                return Ok((payment_ref.clone(), method_label.clone(), None));
            }
        };

        let customer_ref = wallet
            .customer_ref
            .clone()
            .ok_or_else(|| WalletError::validation("payment", "wallet has no payment customer"))?;

        let description = format!(
            "Purchased {} credits for {} {:.2} (incl. VAT)",
            total_credits,
            cmd.currency,
            total_cents as f64 / 100.0
        );
        let mut metadata = std::collections::HashMap::new();
        metadata.insert("user_id".to_string(), cmd.user_id.to_string());
        metadata.insert("email".to_string(), cmd.email.clone());
        metadata.insert("purpose".to_string(), "wallet_topup".to_string());
        metadata.insert("vat_rate".to_string(), vat.rate.to_string());
        metadata.insert("reverse_charge".to_string(), vat.reverse_charge.to_string());
        metadata.insert(
            "country_code".to_string(),
            cmd.billing.country_code.to_uppercase(),
        );
        metadata.insert(
            "vat_number".to_string(),
            cmd.billing
                .vat_number
                .as_deref()
                .map(normalize_vat_number)
                .unwrap_or_else(|| "none".to_string()),
        );
        metadata.insert("total_charged".to_string(), total_cents.to_string());

        let capture = self
            .payment_provider
            .capture(CaptureRequest {
                amount_cents: total_cents,
                currency: cmd.currency.to_lowercase(),
                customer_ref,
                payment_method_ref: card.payment_method_ref.clone(),
                description,
                metadata,
            })
            .await
            .map_err(|err| match err.code {
                PaymentErrorCode::AuthenticationRequired => WalletError::AuthenticationRequired,
                _ => WalletError::payment_failed(err.message),
            })?;

        match capture.status {
            CaptureStatus::Succeeded => {}
            CaptureStatus::RequiresAction => return Err(WalletError::AuthenticationRequired),
            CaptureStatus::Failed => {
                return Err(WalletError::payment_failed("payment was not completed"))
            }
        }

        Ok((capture.id.clone(), card.brand.clone(), Some(capture)))
    }
}

fn validate(cmd: &AddFundsCommand) -> Result<(), WalletError> {
    if cmd.amount_cents <= 0 {
        return Err(WalletError::validation("amount", "must be positive"));
    }
    if cmd.discount_cents < 0 {
        return Err(WalletError::validation("discount", "cannot be negative"));
    }
    if cmd.credits.is_empty() {
        return Err(WalletError::validation("credits", "at least one credit line is required"));
    }
    if cmd.credits.iter().any(|line| line.credits <= 0) {
        return Err(WalletError::validation("credits", "credit counts must be positive"));
    }

    let billing = &cmd.billing;
    for (field, value) in [
        ("name", &billing.name),
        ("street", &billing.street),
        ("postal_code", &billing.postal_code),
        ("country", &billing.country_code),
    ] {
        if value.trim().is_empty() {
            return Err(WalletError::validation(
                field,
                format!("billing field \"{}\" is required", field),
            ));
        }
    }

    Ok(())
}
