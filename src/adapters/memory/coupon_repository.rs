//! In-memory implementation of CouponRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::coupon::{Coupon, CouponStatus};
use crate::domain::foundation::{CouponId, DomainError, ErrorCode, Timestamp};
use crate::ports::CouponRepository;

/// In-memory coupon store for tests and local development.
#[derive(Default)]
pub struct InMemoryCouponRepository {
    coupons: RwLock<HashMap<CouponId, Coupon>>,
}

impl InMemoryCouponRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CouponRepository for InMemoryCouponRepository {
    async fn save(&self, coupon: &Coupon) -> Result<(), DomainError> {
        let mut coupons = self.coupons.write().await;
        if coupons.values().any(|c| c.code == coupon.code) {
            return Err(DomainError::new(
                ErrorCode::DuplicateCoupon,
                "Coupon code already exists",
            ));
        }
        coupons.insert(coupon.id, coupon.clone());
        Ok(())
    }

    async fn update(&self, coupon: &Coupon) -> Result<(), DomainError> {
        let mut coupons = self.coupons.write().await;
        if !coupons.contains_key(&coupon.id) {
            return Err(DomainError::new(ErrorCode::CouponNotFound, "Coupon not found"));
        }
        coupons.insert(coupon.id, coupon.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CouponId) -> Result<Option<Coupon>, DomainError> {
        Ok(self.coupons.read().await.get(id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, DomainError> {
        let code = code.trim().to_uppercase();
        Ok(self
            .coupons
            .read()
            .await
            .values()
            .find(|c| c.code == code)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Coupon>, DomainError> {
        let mut coupons: Vec<Coupon> = self.coupons.read().await.values().cloned().collect();
        coupons.sort_by_key(|c| std::cmp::Reverse(c.created_at));
        Ok(coupons)
    }

    async fn deactivate_expired(&self, now: Timestamp) -> Result<u64, DomainError> {
        let mut coupons = self.coupons.write().await;
        let mut transitioned = 0;
        for coupon in coupons.values_mut() {
            if coupon.status == CouponStatus::Active && coupon.is_expired(now) {
                coupon.deactivate();
                transitioned += 1;
            }
        }
        Ok(transitioned)
    }
}
