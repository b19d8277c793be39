//! ListValidCouponsHandler - public storefront coupon list.
//!
//! Only shareable coupons appear: active, not user-bound, unexpired, and
//! under their usage limit.

use std::sync::Arc;

use crate::domain::coupon::{Coupon, CouponError};
use crate::domain::foundation::Timestamp;
use crate::ports::CouponRepository;

/// Handler for the public coupon listing.
pub struct ListValidCouponsHandler {
    coupons: Arc<dyn CouponRepository>,
}

impl ListValidCouponsHandler {
    pub fn new(coupons: Arc<dyn CouponRepository>) -> Self {
        Self { coupons }
    }

    pub async fn handle(&self, now: Timestamp) -> Result<Vec<Coupon>, CouponError> {
        let coupons = self.coupons.find_all().await?;
        Ok(coupons
            .into_iter()
            .filter(|coupon| coupon.available_for_listing(now))
            .collect())
    }
}
