//! PricesInCurrencyHandler - storefront prices converted to a currency.
//!
//! Conversion applies to each product's effective list price using the
//! cached rate table. An unknown currency is a validation error; a dead
//! rate source surfaces as an infrastructure error, never as zero prices.

use std::sync::Arc;

use crate::application::rate_cache::ExchangeRateService;
use crate::domain::foundation::ProductId;
use crate::domain::pricing::PricingError;
use crate::ports::ProductRepository;

/// One product with its converted price.
#[derive(Debug, Clone)]
pub struct LocalizedPrice {
    pub product_id: ProductId,
    pub name: String,
    pub credits: i64,
    /// Uppercase target currency code.
    pub currency: String,
    /// Converted price, rounded to two decimals.
    pub price: f64,
    /// The EUR list price the conversion started from.
    pub list_price_cents: i64,
}

/// Handler for currency-converted product listings.
pub struct PricesInCurrencyHandler {
    products: Arc<dyn ProductRepository>,
    rates: Arc<ExchangeRateService>,
}

impl PricesInCurrencyHandler {
    pub fn new(products: Arc<dyn ProductRepository>, rates: Arc<ExchangeRateService>) -> Self {
        Self { products, rates }
    }

    pub async fn handle(&self, currency: &str) -> Result<Vec<LocalizedPrice>, PricingError> {
        let currency = currency.trim().to_uppercase();
        if currency.is_empty() {
            return Err(PricingError::validation("currency", "currency is required"));
        }

        let table = self.rates.rates().await?;
        let rate = table
            .rate_for(&currency)
            .ok_or_else(|| PricingError::unsupported_currency(&currency))?;

        let products = self.products.find_all().await?;
        Ok(products
            .into_iter()
            .map(|product| {
                let eur = product.list_price_cents as f64 / 100.0;
                LocalizedPrice {
                    product_id: product.id,
                    name: product.name.clone(),
                    credits: product.credits,
                    currency: currency.clone(),
                    price: (eur * rate * 100.0).round() / 100.0,
                    list_price_cents: product.list_price_cents,
                }
            })
            .collect())
    }
}
