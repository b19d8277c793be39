//! Per-user wallet mutation serialization.
//!
//! The store offers per-document atomicity but no cross-operation lock, so
//! two concurrent purchases (or a purchase racing a cancellation) could
//! interleave their read-modify-write on the same wallet and lose updates.
//! Every handler that mutates a wallet acquires that user's lock for the
//! whole read-mutate-persist span.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::UserId;

/// Map of per-user async mutexes.
///
/// Locks are created on first use and kept for the process lifetime; the
/// set of users active in one process is small enough that reclamation
/// isn't worth the complexity.
#[derive(Default)]
pub struct WalletLockMap {
    locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl WalletLockMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for a user's wallet, waiting if another task
    /// holds it. The guard releases on drop.
    pub async fn acquire(&self, user_id: &UserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(*user_id).or_default())
        };
        lock.lock_owned().await
    }
}
