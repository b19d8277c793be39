//! Email configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Email configuration for outgoing notifications
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailConfig {
    /// From address for transactional mail
    #[serde(default)]
    pub from_address: String,

    /// Admin address copied on order events
    #[serde(default)]
    pub admin_address: String,
}

impl EmailConfig {
    /// Validate email configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.from_address.is_empty() {
            return Err(ValidationError::MissingRequired("EMAIL_FROM_ADDRESS"));
        }
        if !self.from_address.contains('@') {
            return Err(ValidationError::InvalidEmailAddress("from_address"));
        }
        if !self.admin_address.is_empty() && !self.admin_address.contains('@') {
            return Err(ValidationError::InvalidEmailAddress("admin_address"));
        }
        Ok(())
    }
}
