//! In-memory implementation of WalletRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, UserId, WalletId};
use crate::domain::wallet::Wallet;
use crate::ports::WalletRepository;

/// In-memory wallet store for tests and local development.
#[derive(Default)]
pub struct InMemoryWalletRepository {
    wallets: RwLock<HashMap<WalletId, Wallet>>,
}

impl InMemoryWalletRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletRepository for InMemoryWalletRepository {
    async fn save(&self, wallet: &Wallet) -> Result<(), DomainError> {
        let mut wallets = self.wallets.write().await;
        if wallets.values().any(|w| w.user_id == wallet.user_id) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "User already has a wallet",
            ));
        }
        wallets.insert(wallet.id, wallet.clone());
        Ok(())
    }

    async fn update(&self, wallet: &Wallet) -> Result<(), DomainError> {
        let mut wallets = self.wallets.write().await;
        if !wallets.contains_key(&wallet.id) {
            return Err(DomainError::new(ErrorCode::WalletNotFound, "Wallet not found"));
        }
        wallets.insert(wallet.id, wallet.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &WalletId) -> Result<Option<Wallet>, DomainError> {
        Ok(self.wallets.read().await.get(id).cloned())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Wallet>, DomainError> {
        Ok(self
            .wallets
            .read()
            .await
            .values()
            .find(|w| &w.user_id == user_id)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Wallet>, DomainError> {
        Ok(self.wallets.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_and_find_by_user() {
        let repo = InMemoryWalletRepository::new();
        let wallet = Wallet::new(WalletId::new(), UserId::new());
        repo.save(&wallet).await.unwrap();

        let found = repo.find_by_user_id(&wallet.user_id).await.unwrap();
        assert_eq!(found.unwrap().id, wallet.id);
    }

    #[tokio::test]
    async fn save_rejects_second_wallet_for_same_user() {
        let repo = InMemoryWalletRepository::new();
        let user = UserId::new();
        repo.save(&Wallet::new(WalletId::new(), user)).await.unwrap();

        let result = repo.save(&Wallet::new(WalletId::new(), user)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn update_requires_existing_wallet() {
        let repo = InMemoryWalletRepository::new();
        let wallet = Wallet::new(WalletId::new(), UserId::new());
        let result = repo.update(&wallet).await;
        assert!(result.is_err());
    }
}
