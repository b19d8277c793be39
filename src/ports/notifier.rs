//! Fire-and-forget user notification port.
//!
//! Notification delivery failures must never roll back or fail the core
//! operation that triggered them; handlers log and swallow errors from
//! this port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::DomainError;

/// Notification templates the core emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTemplate {
    /// Credits were added to the wallet after a purchase.
    FundsAdded,

    /// An order was cancelled, possibly with a refund.
    OrderCancelled,

    /// An admin created a manual order for the user.
    ManualOrderCreated,
}

/// Port for sending user notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a templated notification to the given address.
    async fn notify(
        &self,
        recipient: &str,
        template: NotificationTemplate,
        data: serde_json::Value,
    ) -> Result<(), DomainError>;
}
