//! SweepExpiredCouponsHandler - bulk-deactivates expired coupons.
//!
//! Externally triggered (cron or pre-read hook). Safe to run repeatedly;
//! a second sweep with no newly expired coupons transitions nothing.

use std::sync::Arc;

use crate::domain::coupon::CouponError;
use crate::domain::foundation::Timestamp;
use crate::ports::CouponRepository;

/// Handler for the coupon expiry sweep.
pub struct SweepExpiredCouponsHandler {
    coupons: Arc<dyn CouponRepository>,
}

impl SweepExpiredCouponsHandler {
    pub fn new(coupons: Arc<dyn CouponRepository>) -> Self {
        Self { coupons }
    }

    /// Returns how many coupons were transitioned to inactive.
    pub async fn handle(&self, now: Timestamp) -> Result<u64, CouponError> {
        let transitioned = self.coupons.deactivate_expired(now).await?;
        if transitioned > 0 {
            tracing::info!(transitioned, "Expired coupons marked inactive");
        }
        Ok(transitioned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryCouponRepository;
    use crate::domain::coupon::{Coupon, CouponKind, CouponStatus, NewCoupon, UsageRestriction};
    use crate::ports::CouponRepository as _;

    fn coupon(code: &str, expires_at: Timestamp) -> Coupon {
        Coupon::create(NewCoupon {
            code: code.to_string(),
            kind: CouponKind::FixedCart,
            amount: 500,
            description: String::new(),
            usage_limit: None,
            expires_at,
            min_cart_total_cents: 0,
            max_cart_total_cents: None,
            allow_combine: true,
            exclude_sale_items: false,
            product_restriction: vec![],
            cart_min_items: Some(1),
            free_shipping: false,
            restriction: UsageRestriction::default(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn sweep_deactivates_only_expired_coupons_and_is_idempotent() {
        let repo = Arc::new(InMemoryCouponRepository::new());
        repo.save(&coupon("OLD1", Timestamp::now().minus_days(5)))
            .await
            .unwrap();
        repo.save(&coupon("FRESH", Timestamp::now().add_days(5)))
            .await
            .unwrap();

        let handler = SweepExpiredCouponsHandler::new(repo.clone());
        let now = Timestamp::now();

        assert_eq!(handler.handle(now).await.unwrap(), 1);
        assert_eq!(handler.handle(now).await.unwrap(), 0);

        let old = repo.find_by_code("OLD1").await.unwrap().unwrap();
        assert_eq!(old.status, CouponStatus::Inactive);
        let fresh = repo.find_by_code("FRESH").await.unwrap().unwrap();
        assert_eq!(fresh.status, CouponStatus::Active);
    }
}
