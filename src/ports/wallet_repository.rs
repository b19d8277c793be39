//! Wallet persistence port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId, WalletId};
use crate::domain::wallet::Wallet;

/// Port for wallet persistence. Each wallet is read and written as a
/// whole document; no cross-document transaction is assumed.
#[async_trait]
pub trait WalletRepository: Send + Sync {
    /// Persist a new wallet.
    async fn save(&self, wallet: &Wallet) -> Result<(), DomainError>;

    /// Persist changes to an existing wallet.
    async fn update(&self, wallet: &Wallet) -> Result<(), DomainError>;

    /// Find a wallet by its id.
    async fn find_by_id(&self, id: &WalletId) -> Result<Option<Wallet>, DomainError>;

    /// Find the wallet owned by a user (one per user).
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Wallet>, DomainError>;

    /// All wallets, for admin reporting.
    async fn find_all(&self) -> Result<Vec<Wallet>, DomainError>;
}
