//! ListSchedulesHandler - admin overview of all price schedules.

use std::sync::Arc;

use crate::domain::foundation::{ProductId, Timestamp};
use crate::domain::pricing::{PackageType, PricingError, ScheduleStatus};
use crate::ports::ProductRepository;

/// One schedule row in the admin listing.
#[derive(Debug, Clone)]
pub struct ScheduleSummary {
    pub product_id: ProductId,
    pub product_name: String,
    pub package_type: PackageType,
    pub new_price_cents: i64,
    pub discount_percent: u8,
    pub starts_at: Timestamp,
    pub ends_at: Option<Timestamp>,
    pub reason: String,
    pub status: ScheduleStatus,
}

/// Handler for the schedule listing.
pub struct ListSchedulesHandler {
    products: Arc<dyn ProductRepository>,
}

impl ListSchedulesHandler {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn handle(&self, now: Timestamp) -> Result<Vec<ScheduleSummary>, PricingError> {
        let products = self.products.find_with_schedules().await?;

        let mut summaries = Vec::new();
        for product in products {
            for schedule in &product.schedules {
                summaries.push(ScheduleSummary {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    package_type: product.package_type,
                    new_price_cents: schedule.new_price_cents,
                    discount_percent: schedule.discount_percent.value(),
                    starts_at: schedule.starts_at,
                    ends_at: schedule.ends_at,
                    reason: schedule.reason.clone(),
                    status: schedule.status_at(now),
                });
            }
        }

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryProductRepository;
    use crate::domain::pricing::{schedule, Product};
    use crate::ports::ProductRepository as _;
    use chrono::{DateTime, Utc};

    fn ts(s: &str) -> Timestamp {
        Timestamp::from_datetime(DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc))
    }

    #[tokio::test]
    async fn listing_reports_status_per_schedule() {
        let repo = Arc::new(InMemoryProductRepository::new());
        let mut product =
            Product::new(ProductId::new(), "Standard Pack", PackageType::Standard, 50, 6_500);
        product
            .add_schedule(schedule(
                7_000,
                0,
                ts("2026-01-01T00:00:00Z"),
                Some(ts("2026-01-31T00:00:00Z")),
                "january",
            ))
            .unwrap();
        product
            .add_schedule(schedule(8_000, 0, ts("2026-06-01T00:00:00Z"), None, "summer"))
            .unwrap();
        repo.save(&product).await.unwrap();

        let summaries = ListSchedulesHandler::new(repo)
            .handle(ts("2026-01-15T00:00:00Z"))
            .await
            .unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].status, ScheduleStatus::Active);
        assert_eq!(summaries[1].status, ScheduleStatus::Scheduled);
        assert_eq!(summaries[0].reason, "january");
    }
}
