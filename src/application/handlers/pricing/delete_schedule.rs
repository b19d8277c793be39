//! DeleteScheduleHandler - removes a schedule entry by position.

use std::sync::Arc;

use crate::domain::foundation::ProductId;
use crate::domain::pricing::{PriceSchedule, PricingError, Product};
use crate::ports::ProductRepository;

/// Command to delete a scheduled price change.
#[derive(Debug, Clone)]
pub struct DeleteScheduleCommand {
    pub product_id: ProductId,
    pub index: usize,
}

/// Result of the deletion.
#[derive(Debug, Clone)]
pub struct DeleteScheduleResult {
    pub removed: PriceSchedule,
    pub product: Product,
}

/// Handler for schedule deletion.
pub struct DeleteScheduleHandler {
    products: Arc<dyn ProductRepository>,
}

impl DeleteScheduleHandler {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn handle(&self, cmd: DeleteScheduleCommand) -> Result<DeleteScheduleResult, PricingError> {
        let mut product = self
            .products
            .find_by_id(&cmd.product_id)
            .await?
            .ok_or_else(|| PricingError::product_not_found(cmd.product_id))?;

        let removed = product.remove_schedule(cmd.index)?;
        self.products.update(&product).await?;

        Ok(DeleteScheduleResult { removed, product })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryProductRepository;
    use crate::domain::foundation::Timestamp;
    use crate::domain::pricing::{schedule, PackageType};
    use crate::ports::ProductRepository as _;

    #[tokio::test]
    async fn deleting_a_schedule_reverts_the_price() {
        let repo = Arc::new(InMemoryProductRepository::new());
        let mut product =
            Product::new(ProductId::new(), "Basic Pack", PackageType::Basic, 15, 1_500);
        product
            .add_schedule(schedule(2_000, 10, Timestamp::now().minus_days(1), None, "sale"))
            .unwrap();
        product.apply_schedules(Timestamp::now());
        let id = product.id;
        repo.save(&product).await.unwrap();

        let result = DeleteScheduleHandler::new(repo.clone())
            .handle(DeleteScheduleCommand {
                product_id: id,
                index: 0,
            })
            .await
            .unwrap();

        assert_eq!(result.removed.new_price_cents, 2_000);
        let stored = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.list_price_cents, 1_500);
        assert_eq!(stored.previous_price_cents, None);
        assert!(!stored.has_schedules());
    }

    #[tokio::test]
    async fn out_of_range_index_is_rejected() {
        let repo = Arc::new(InMemoryProductRepository::new());
        let product =
            Product::new(ProductId::new(), "Basic Pack", PackageType::Basic, 15, 1_500);
        let id = product.id;
        repo.save(&product).await.unwrap();

        let result = DeleteScheduleHandler::new(repo)
            .handle(DeleteScheduleCommand {
                product_id: id,
                index: 3,
            })
            .await;

        assert!(matches!(result, Err(PricingError::InvalidScheduleIndex { .. })));
    }
}
