//! Coupon domain - discount codes with usage tracking.

mod aggregate;
mod errors;

pub use aggregate::{
    Coupon, CouponKind, CouponStatus, NewCoupon, Purchaser, Redemption, UsageRestriction,
};
pub use errors::CouponError;
