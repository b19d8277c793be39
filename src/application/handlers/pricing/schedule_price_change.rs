//! SchedulePriceChangeHandler - adds a price override to a product.

use std::sync::Arc;

use crate::domain::foundation::{Percentage, ProductId, Timestamp};
use crate::domain::pricing::{PriceSchedule, PricingError, Product};
use crate::ports::ProductRepository;

/// Command to schedule a price change.
#[derive(Debug, Clone)]
pub struct SchedulePriceChangeCommand {
    pub product_id: ProductId,
    pub new_price_cents: i64,
    pub discount_percent: u8,
    pub starts_at: Timestamp,
    pub ends_at: Option<Timestamp>,
    pub reason: Option<String>,
}

/// Handler for scheduling price changes.
pub struct SchedulePriceChangeHandler {
    products: Arc<dyn ProductRepository>,
}

impl SchedulePriceChangeHandler {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn handle(&self, cmd: SchedulePriceChangeCommand) -> Result<Product, PricingError> {
        let discount = Percentage::try_new(cmd.discount_percent)
            .map_err(|_| PricingError::validation("discount_percent", "must be between 0 and 100"))?;

        let mut product = self
            .products
            .find_by_id(&cmd.product_id)
            .await?
            .ok_or_else(|| PricingError::product_not_found(cmd.product_id))?;

        product.add_schedule(PriceSchedule::new(
            cmd.new_price_cents,
            discount,
            cmd.starts_at,
            cmd.ends_at,
            cmd.reason.map(|r| r.trim().to_string()).unwrap_or_default(),
        ))?;

        self.products.update(&product).await?;
        Ok(product)
    }
}
