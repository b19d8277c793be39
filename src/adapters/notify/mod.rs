//! Notification adapter implementing the `Notifier` port.
//!
//! Actual delivery (email, push) is wired in by the surrounding service;
//! this adapter records the notification in the structured log, which is
//! also what tests observe.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::ports::{NotificationTemplate, Notifier};

/// Notifier that logs each notification instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNotifier;

impl LoggingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify(
        &self,
        recipient: &str,
        template: NotificationTemplate,
        data: serde_json::Value,
    ) -> Result<(), DomainError> {
        tracing::info!(
            recipient,
            template = ?template,
            %data,
            "Notification emitted"
        );
        Ok(())
    }
}
