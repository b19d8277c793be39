//! Shared fixtures for the handler integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use reelcraft_backend::adapters::memory::{
    InMemoryCouponRepository, InMemoryInvoiceRepository, InMemoryWalletRepository,
};
use reelcraft_backend::adapters::notify::LoggingNotifier;
use reelcraft_backend::adapters::stripe::MockPaymentProvider;
use reelcraft_backend::application::handlers::wallet::{
    AddFundsCommand, BillingInput, CreditLine, PaymentSelection,
};
use reelcraft_backend::application::wallet_locks::WalletLockMap;
use reelcraft_backend::domain::foundation::{DomainError, UserId, WalletId};
use reelcraft_backend::domain::wallet::{SavedCard, Wallet};
use reelcraft_backend::ports::{VatValidator, WalletRepository};

/// VAT validator double: NL/DE/FR are EU, VAT numbers validate per flag.
pub struct StubVatValidator {
    pub vat_valid: bool,
}

#[async_trait]
impl VatValidator for StubVatValidator {
    fn is_eu_country(&self, country_code: &str) -> bool {
        matches!(country_code, "NL" | "DE" | "FR")
    }

    async fn validate_vat_number(
        &self,
        _vat_number: &str,
        _country_code: &str,
    ) -> Result<bool, DomainError> {
        Ok(self.vat_valid)
    }
}

/// Everything a handler test needs, wired over the in-memory adapters.
pub struct TestBackend {
    pub wallets: Arc<InMemoryWalletRepository>,
    pub invoices: Arc<InMemoryInvoiceRepository>,
    pub coupons: Arc<InMemoryCouponRepository>,
    pub payment: Arc<MockPaymentProvider>,
    pub notifier: Arc<LoggingNotifier>,
    pub locks: Arc<WalletLockMap>,
    pub user_id: UserId,
}

impl TestBackend {
    /// Backend with one user whose wallet has a saved primary card.
    pub async fn with_carded_user() -> Self {
        Self::build(MockPaymentProvider::new()).await
    }

    pub async fn with_provider(payment: MockPaymentProvider) -> Self {
        Self::build(payment).await
    }

    async fn build(payment: MockPaymentProvider) -> Self {
        let wallets = Arc::new(InMemoryWalletRepository::new());
        let user_id = UserId::new();
        let mut wallet = Wallet::new(WalletId::new(), user_id);
        wallet.set_customer_ref("cus_test");
        wallet
            .add_card(SavedCard::new("pm_1", "visa", "4242", 12, 2030))
            .expect("fresh wallet accepts a card");
        wallets.save(&wallet).await.expect("wallet saves");

        Self {
            wallets,
            invoices: Arc::new(InMemoryInvoiceRepository::new()),
            coupons: Arc::new(InMemoryCouponRepository::new()),
            payment: Arc::new(payment),
            notifier: Arc::new(LoggingNotifier::new()),
            locks: Arc::new(WalletLockMap::new()),
            user_id,
        }
    }

    pub async fn wallet(&self) -> Wallet {
        self.wallets
            .find_by_user_id(&self.user_id)
            .await
            .expect("lookup succeeds")
            .expect("wallet exists")
    }
}

/// A standard EUR purchase command: €100 subtotal, 100 credits, NL consumer.
pub fn purchase_command(user_id: UserId) -> AddFundsCommand {
    AddFundsCommand {
        user_id,
        email: "buyer@example.com".to_string(),
        amount_cents: 10_000,
        discount_cents: 0,
        price_before_discount_cents: None,
        currency: "EUR".to_string(),
        billing: BillingInput {
            name: "Jan de Vries".to_string(),
            street: "Keizersgracht 1".to_string(),
            postal_code: "1015 CN".to_string(),
            city: "Amsterdam".to_string(),
            country_code: "NL".to_string(),
            country_name: "Netherlands".to_string(),
            company_name: String::new(),
            vat_number: None,
        },
        credits: vec![CreditLine {
            amount_cents: 10_000,
            credits: 100,
        }],
        coupon_code: None,
        payment: PaymentSelection::PrimaryCard,
    }
}
