//! EU membership table and VIES VAT number validation client.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::VatValidator;

/// ISO alpha-2 codes of the EU VAT area.
static EU_COUNTRIES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "AT", "BE", "BG", "HR", "CY", "CZ", "DK", "EE", "FI", "FR", "DE", "GR", "HU", "IE",
        "IT", "LV", "LT", "LU", "MT", "NL", "PL", "PT", "RO", "SK", "SI", "ES", "SE",
    ]
    .into_iter()
    .collect()
});

/// VAT validator backed by the EU VIES REST service.
pub struct ViesVatValidator {
    api_base_url: String,
    http_client: reqwest::Client,
}

impl ViesVatValidator {
    pub fn new() -> Result<Self, DomainError> {
        Self::with_base_url("https://ec.europa.eu/taxation_customs/vies/rest-api")
    }

    /// Use a custom base URL (for testing).
    pub fn with_base_url(url: impl Into<String>) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("failed to build HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            api_base_url: url.into(),
            http_client,
        })
    }
}

/// Strips a leading country prefix ("NL123..." -> "123...") since VIES
/// expects the bare number.
fn strip_country_prefix<'a>(vat_number: &'a str, country_code: &str) -> &'a str {
    vat_number
        .strip_prefix(country_code)
        .unwrap_or(vat_number)
}

#[async_trait]
impl VatValidator for ViesVatValidator {
    fn is_eu_country(&self, country_code: &str) -> bool {
        EU_COUNTRIES.contains(country_code.to_uppercase().as_str())
    }

    async fn validate_vat_number(
        &self,
        vat_number: &str,
        country_code: &str,
    ) -> Result<bool, DomainError> {
        let country_code = country_code.to_uppercase();
        if !self.is_eu_country(&country_code) {
            return Ok(false);
        }

        let number = strip_country_prefix(vat_number.trim(), &country_code);
        let url = format!("{}/ms/{}/vat/{}", self.api_base_url, country_code, number);

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            DomainError::new(
                ErrorCode::UpstreamUnavailable,
                format!("VIES request failed: {}", e),
            )
        })?;

        let body: ViesResponse = response.json().await.map_err(|e| {
            DomainError::new(
                ErrorCode::UpstreamUnavailable,
                format!("failed to decode VIES response: {}", e),
            )
        })?;

        Ok(body.is_valid)
    }
}

#[derive(Debug, Deserialize)]
struct ViesResponse {
    #[serde(rename = "isValid", default)]
    is_valid: bool,
}
