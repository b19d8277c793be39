//! ValidateCouponHandler - checks a coupon without consuming usage.

use std::sync::Arc;

use crate::domain::coupon::{Coupon, CouponError, Purchaser};
use crate::domain::foundation::Timestamp;
use crate::ports::CouponRepository;

/// Command to validate a coupon code.
#[derive(Debug, Clone)]
pub struct ValidateCouponCommand {
    pub code: String,
    /// Authenticated purchaser, when there is one. Required for coupons
    /// bound to a single user.
    pub purchaser: Option<Purchaser>,
}

/// Handler for coupon validation.
pub struct ValidateCouponHandler {
    coupons: Arc<dyn CouponRepository>,
}

impl ValidateCouponHandler {
    pub fn new(coupons: Arc<dyn CouponRepository>) -> Self {
        Self { coupons }
    }

    /// Returns the full coupon record when every rule passes; the first
    /// failing rule otherwise. Usage is only consumed later, after the
    /// purchase completes.
    pub async fn handle(&self, cmd: ValidateCouponCommand) -> Result<Coupon, CouponError> {
        if cmd.code.trim().is_empty() {
            return Err(CouponError::validation("code", "coupon code is required"));
        }

        let coupon = self
            .coupons
            .find_by_code(&cmd.code)
            .await?
            .ok_or_else(|| CouponError::not_found(cmd.code.trim().to_uppercase()))?;

        coupon.validate_for(cmd.purchaser.as_ref(), Timestamp::now())?;
        Ok(coupon)
    }
}
