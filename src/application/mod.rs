//! Application layer - command handlers and application services.

pub mod handlers;
pub mod rate_cache;
pub mod wallet_locks;
