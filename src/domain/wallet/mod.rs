//! Wallet domain - per-user credit accounting.
//!
//! The wallet aggregate owns the balance mutation rules; the ledger is the
//! append-only audit trail reconciling every change.

mod aggregate;
mod card;
mod errors;
mod ledger;

pub use aggregate::Wallet;
pub use card::SavedCard;
pub use errors::WalletError;
pub use ledger::{LedgerEntry, LedgerEntryType};
