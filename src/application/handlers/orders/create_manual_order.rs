//! CreateManualOrderHandler - admin places an order without payment.
//!
//! VAT is decided exactly like a purchase (reverse charge for validated
//! intra-EU VAT numbers), but no payment is captured; the wallet is
//! credited directly and the invoice records the grant as manual.

use std::sync::Arc;

use crate::application::handlers::wallet::BillingInput;
use crate::application::wallet_locks::WalletLockMap;
use crate::domain::billing::{normalize_vat_number, BillingDetails, Invoice, InvoiceStatus, OrderError};
use crate::domain::foundation::{InvoiceId, UserId};
use crate::ports::{InvoiceRepository, VatValidator, WalletRepository};

use super::resolve_vat;

/// Command to create a manual order.
#[derive(Debug, Clone)]
pub struct CreateManualOrderCommand {
    pub user_id: UserId,
    pub amount_cents: i64,
    pub credits: i64,
    pub billing: BillingInput,
    pub payment_method: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub notes: Option<String>,
}

/// Result of a manual order.
#[derive(Debug, Clone)]
pub struct CreateManualOrderResult {
    pub invoice: Invoice,
    pub wallet_balance: i64,
}

/// Handler for admin manual orders.
pub struct CreateManualOrderHandler {
    wallets: Arc<dyn WalletRepository>,
    invoices: Arc<dyn InvoiceRepository>,
    vat_validator: Arc<dyn VatValidator>,
    locks: Arc<WalletLockMap>,
}

impl CreateManualOrderHandler {
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
        cmd: CreateManualOrderCommand,
    ) -> Result<CreateManualOrderResult, OrderError> {
        // 1. Validate before any lookup
        if cmd.amount_cents <= 0 {
            return Err(OrderError::validation("amount", "must be positive"));
        }
        if cmd.credits <= 0 {
            return Err(OrderError::validation("credits", "must be positive"));
        }

        let _guard = self.locks.acquire(&cmd.user_id).await;

        let mut wallet = self
            .wallets
            .find_by_user_id(&cmd.user_id)
            .await?
            .ok_or_else(|| OrderError::wallet_not_found(cmd.user_id))?;

        // 2. Same VAT decision as paid purchases
        let vat = resolve_vat(
            self.vat_validator.as_ref(),
            &cmd.billing.country_code,
            cmd.billing.vat_number.as_deref(),
        )
        .await?;

        // 3. Credit the wallet
        let invoice_id = InvoiceId::new();
        wallet
            .credit(
                cmd.credits,
                0,
                Some(invoice_id),
                "Manual order placement by admin",
            )
            .map_err(|e| OrderError::infrastructure(e.message()))?;
        self.wallets.update(&wallet).await?;

        // 4. Persist the invoice
        let invoice_number = self.invoices.next_invoice_number().await?;
        let invoice = Invoice::manual_order(
            invoice_id,
            invoice_number,
            cmd.user_id,
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
            cmd.payment_method.unwrap_or_else(|| "manual".to_string()),
            cmd.status.unwrap_or(InvoiceStatus::Completed),
            cmd.notes.unwrap_or_default(),
        );
        self.invoices.save(&invoice).await?;

        Ok(CreateManualOrderResult {
            invoice,
            wallet_balance: wallet.balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryInvoiceRepository, InMemoryWalletRepository};
    use crate::application::handlers::orders::tests::StubVatValidator;
    use crate::domain::foundation::WalletId;
    use crate::domain::wallet::{LedgerEntryType, Wallet};

    fn billing(country_code: &str, vat_number: Option<&str>) -> BillingInput {
        BillingInput {
            name: "Acme BV".to_string(),
            street: "Herengracht 5".to_string(),
            postal_code: "1017 BN".to_string(),
            city: "Amsterdam".to_string(),
            country_code: country_code.to_string(),
            country_name: "Netherlands".to_string(),
            company_name: "Acme BV".to_string(),
            vat_number: vat_number.map(String::from),
        }
    }

    async fn fixture() -> (
        Arc<InMemoryWalletRepository>,
        Arc<InMemoryInvoiceRepository>,
        UserId,
    ) {
        let wallets = Arc::new(InMemoryWalletRepository::new());
        let user_id = UserId::new();
        wallets
            .save(&Wallet::new(WalletId::new(), user_id))
            .await
            .unwrap();
        (wallets, Arc::new(InMemoryInvoiceRepository::new()), user_id)
    }

    #[tokio::test]
    async fn manual_order_credits_wallet_and_applies_vat() {
        let (wallets, invoices, user_id) = fixture().await;
        let handler = CreateManualOrderHandler::new(
            wallets.clone(),
            invoices.clone(),
            Arc::new(StubVatValidator { vat_valid: false }),
            Arc::new(WalletLockMap::new()),
        );

        let result = handler
            .handle(CreateManualOrderCommand {
                user_id,
                amount_cents: 10_000,
                credits: 100,
                billing: billing("NL", None),
                payment_method: None,
                status: None,
                notes: Some("phone order".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(result.wallet_balance, 100);
        assert_eq!(result.invoice.vat_cents, 2_100);
        assert_eq!(result.invoice.total_cents, 12_100);
        assert!(result.invoice.is_manual_grant());
        assert_eq!(result.invoice.payment_method, "manual");
        assert_eq!(result.invoice.notes, "phone order");

        let wallet = wallets.find_by_user_id(&user_id).await.unwrap().unwrap();
        assert_eq!(wallet.total_purchased, 100);
        assert_eq!(wallet.ledger[0].entry_type, LedgerEntryType::Purchase);
    }

    #[tokio::test]
    async fn validated_vat_number_reverse_charges_manual_order() {
        let (wallets, invoices, user_id) = fixture().await;
        let handler = CreateManualOrderHandler::new(
            wallets,
            invoices,
            Arc::new(StubVatValidator { vat_valid: true }),
            Arc::new(WalletLockMap::new()),
        );

        let result = handler
            .handle(CreateManualOrderCommand {
                user_id,
                amount_cents: 10_000,
                credits: 100,
                billing: billing("NL", Some("NL123456789B01")),
                payment_method: None,
                status: None,
                notes: None,
            })
            .await
            .unwrap();

        assert!(result.invoice.reverse_charge);
        assert_eq!(result.invoice.total_cents, 10_000);
    }

    #[tokio::test]
    async fn missing_wallet_is_an_error() {
        let wallets = Arc::new(InMemoryWalletRepository::new());
        let handler = CreateManualOrderHandler::new(
            wallets,
            Arc::new(InMemoryInvoiceRepository::new()),
            Arc::new(StubVatValidator { vat_valid: false }),
            Arc::new(WalletLockMap::new()),
        );

        let result = handler
            .handle(CreateManualOrderCommand {
                user_id: UserId::new(),
                amount_cents: 10_000,
                credits: 100,
                billing: billing("NL", None),
                payment_method: None,
                status: None,
                notes: None,
            })
            .await;

        assert!(matches!(result, Err(OrderError::WalletNotFound(_))));
    }
}
