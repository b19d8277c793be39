//! CreateCouponHandler - admin creates a discount coupon.
//!
//! The request payload is an explicit command struct validated in one
//! place: type-specific rules in `Coupon::create`, uniqueness against the
//! repository.

use std::sync::Arc;

use crate::domain::coupon::{Coupon, CouponError, CouponKind, NewCoupon, UsageRestriction};
use crate::domain::foundation::Timestamp;
use crate::ports::CouponRepository;

/// Command to create a coupon.
#[derive(Debug, Clone)]
pub struct CreateCouponCommand {
    pub code: String,
    pub kind: CouponKind,
    pub amount: i64,
    pub description: String,
    pub usage_limit: Option<u32>,
    pub expires_at: Timestamp,
    pub min_cart_total_cents: i64,
    pub max_cart_total_cents: Option<i64>,
    pub allow_combine: bool,
    pub exclude_sale_items: bool,
    pub product_restriction: Vec<i64>,
    pub cart_min_items: Option<u32>,
    pub free_shipping: bool,
    pub restriction: UsageRestriction,
}

/// Handler for coupon creation.
pub struct CreateCouponHandler {
    coupons: Arc<dyn CouponRepository>,
}

impl CreateCouponHandler {
    pub fn new(coupons: Arc<dyn CouponRepository>) -> Self {
        Self { coupons }
    }

    pub async fn handle(&self, cmd: CreateCouponCommand) -> Result<Coupon, CouponError> {
        // 1. Field-level validation (percentage range, type rules)
        let coupon = Coupon::create(NewCoupon {
            code: cmd.code,
            kind: cmd.kind,
            amount: cmd.amount,
            description: cmd.description,
            usage_limit: cmd.usage_limit,
            expires_at: cmd.expires_at,
            min_cart_total_cents: cmd.min_cart_total_cents,
            max_cart_total_cents: cmd.max_cart_total_cents,
            allow_combine: cmd.allow_combine,
            exclude_sale_items: cmd.exclude_sale_items,
            product_restriction: cmd.product_restriction,
            cart_min_items: cmd.cart_min_items,
            free_shipping: cmd.free_shipping,
            restriction: cmd.restriction,
        })?;

        // 2. Code uniqueness
        if self.coupons.find_by_code(&coupon.code).await?.is_some() {
            return Err(CouponError::duplicate(&coupon.code));
        }

        self.coupons.save(&coupon).await?;
        Ok(coupon)
    }
}
