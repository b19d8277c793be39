//! AddBillingMethodHandler - saves a card on a wallet.
//!
//! The duplicate check runs before any provider call so a re-submitted
//! form doesn't touch the payment provider at all.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::wallet::{SavedCard, WalletError};
use crate::ports::{PaymentProvider, WalletRepository};

/// Command to save a payment method on a user's wallet.
#[derive(Debug, Clone)]
pub struct AddBillingMethodCommand {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub payment_method_ref: String,
}

/// Result of saving a card.
#[derive(Debug, Clone)]
pub struct AddBillingMethodResult {
    pub card: SavedCard,
}

/// Handler for saving billing methods.
pub struct AddBillingMethodHandler {
    wallets: Arc<dyn WalletRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
}

impl AddBillingMethodHandler {
    pub fn new(
        wallets: Arc<dyn WalletRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            wallets,
            payment_provider,
        }
    }

    pub async fn handle(
        &self,
        cmd: AddBillingMethodCommand,
    ) -> Result<AddBillingMethodResult, WalletError> {
        let mut wallet = self
            .wallets
            .find_by_user_id(&cmd.user_id)
            .await?
            .ok_or_else(|| WalletError::not_found(cmd.user_id))?;

        // 1. Duplicate check before any provider call
        if wallet
            .cards
            .iter()
            .any(|c| c.payment_method_ref == cmd.payment_method_ref)
        {
            return Err(WalletError::duplicate_card(cmd.payment_method_ref));
        }

        // 2. Ensure a provider customer exists
        let customer_ref = match wallet.customer_ref.clone() {
            Some(customer_ref) => customer_ref,
            None => {
                let customer = self
                    .payment_provider
                    .create_customer(&cmd.email, &cmd.name)
                    .await
                    .map_err(|e| WalletError::payment_failed(e.message))?;
                wallet.set_customer_ref(customer.id.clone());
                self.wallets.update(&wallet).await?;
                customer.id
            }
        };

        // 3. Attach and make default at the provider
        let details = self
            .payment_provider
            .attach_payment_method(&cmd.payment_method_ref, &customer_ref)
            .await
            .map_err(|e| WalletError::payment_failed(e.message))?;

        self.payment_provider
            .set_default_payment_method(&customer_ref, &cmd.payment_method_ref)
            .await
            .map_err(|e| WalletError::payment_failed(e.message))?;

        // 4. Save on the wallet (first card becomes primary)
        let card = wallet
            .add_card(SavedCard::new(
                details.id,
                details.brand,
                details.last4,
                details.exp_month,
                details.exp_year,
            ))?
            .clone();
        self.wallets.update(&wallet).await?;

        Ok(AddBillingMethodResult { card })
    }
}
