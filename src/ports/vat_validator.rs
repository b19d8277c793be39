//! EU VAT validation port.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// Port for EU membership and VAT number checks.
///
/// `is_eu_country` is a local table lookup; `validate_vat_number` reaches
/// the external registry and may fail.
#[async_trait]
pub trait VatValidator: Send + Sync {
    /// Whether the ISO alpha-2 country code belongs to the EU VAT area.
    fn is_eu_country(&self, country_code: &str) -> bool;

    /// Whether the VAT number is registered for the given country.
    async fn validate_vat_number(
        &self,
        vat_number: &str,
        country_code: &str,
    ) -> Result<bool, DomainError>;
}
