//! ApplyScheduledChangesHandler - the pricing sweep.
//!
//! Scans every product holding schedules, activates due overrides and
//! reverts expired ones, and persists only products that actually
//! changed. Running it twice back to back is a no-op the second time.

use std::sync::Arc;

use crate::domain::foundation::{ProductId, Timestamp};
use crate::domain::pricing::PricingError;
use crate::ports::ProductRepository;

/// Result of one sweep.
#[derive(Debug, Clone)]
pub struct ApplyScheduledChangesResult {
    pub updated_count: usize,
    pub updated_products: Vec<ProductId>,
}

/// Handler for the scheduled price sweep.
pub struct ApplyScheduledChangesHandler {
    products: Arc<dyn ProductRepository>,
}

impl ApplyScheduledChangesHandler {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn handle(&self, now: Timestamp) -> Result<ApplyScheduledChangesResult, PricingError> {
        let products = self.products.find_with_schedules().await?;

        let mut updated_products = Vec::new();
        for mut product in products {
            if product.apply_schedules(now) {
                self.products.update(&product).await?;
                updated_products.push(product.id);
            }
        }

        if !updated_products.is_empty() {
            tracing::info!(
                updated = updated_products.len(),
                "Scheduled price changes applied"
            );
        }

        Ok(ApplyScheduledChangesResult {
            updated_count: updated_products.len(),
            updated_products,
        })
    }
}
