//! Coupon aggregate entity.
//!
//! A coupon grants a discount at checkout. Validation and redemption are
//! deliberately separate operations: a coupon is validated before payment
//! is attempted, but its usage count is only consumed by `redeem` after the
//! purchase has completed, so a failed payment never burns a use.

use crate::domain::foundation::{CouponId, Percentage, Timestamp, UserId};
use serde::{Deserialize, Serialize};

use super::CouponError;

/// How the coupon's `amount` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    /// `amount` is a percentage of the cart total (1-100).
    Percentage,

    /// `amount` is a fixed discount in cents off the cart.
    FixedCart,

    /// `amount` is a fixed discount in cents off restricted packages.
    FixedProduct,

    /// Free shipping; `amount` is forced to zero.
    Shipping,
}

impl CouponKind {
    /// Stable string form, used in persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            CouponKind::Percentage => "percentage",
            CouponKind::FixedCart => "fixed_cart",
            CouponKind::FixedProduct => "fixed_product",
            CouponKind::Shipping => "shipping",
        }
    }
}

/// Coupon lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponStatus {
    Active,
    Inactive,
}

/// Optional per-user binding on a coupon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRestriction {
    /// Free-form campaign code attached to the restriction.
    pub restriction_code: String,

    /// Minimum order amount in cents for the restriction to apply.
    pub restriction_amount_cents: i64,

    /// When true, only the bound email may redeem the coupon.
    pub individual_use_only: bool,

    /// Email the coupon is bound to (lowercased).
    pub user_email: String,
}

/// One redemption of a coupon. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redemption {
    pub user_id: UserId,
    pub email: String,
    pub used_at: Timestamp,
}

/// Identified purchaser presented during coupon validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchaser {
    pub user_id: UserId,
    pub email: String,
}

/// Fields accepted when creating a coupon, validated by [`Coupon::create`].
#[derive(Debug, Clone)]
pub struct NewCoupon {
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

/// Discount coupon aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Unique identifier.
    pub id: CouponId,

    /// Unique uppercase code.
    pub code: String,

    /// Discount interpretation.
    pub kind: CouponKind,

    /// Percent (1-100) for `Percentage`, cents otherwise, zero for
    /// `Shipping`.
    pub amount: i64,

    /// Admin-facing description.
    pub description: String,

    /// Times the coupon has been redeemed. Monotonic.
    pub usage_count: u32,

    /// Maximum redemptions; `None` = unlimited.
    pub usage_limit: Option<u32>,

    /// Expiry, normalized to the end of its calendar day.
    pub expires_at: Timestamp,

    /// Lifecycle status. Flipped to `Inactive` by the expiry sweep.
    pub status: CouponStatus,

    /// Minimum cart total in cents for the coupon to apply.
    pub min_cart_total_cents: i64,

    /// Maximum cart total in cents; `None` = no cap.
    pub max_cart_total_cents: Option<i64>,

    /// Whether the coupon may combine with others.
    pub allow_combine: bool,

    /// Whether discounted packages are excluded.
    pub exclude_sale_items: bool,

    /// Credit-package sizes the coupon is restricted to; empty = all.
    pub product_restriction: Vec<i64>,

    /// Minimum cart item count; `None` = no restriction.
    pub cart_min_items: Option<u32>,

    /// Free shipping flag. Forced true for `Shipping` coupons.
    pub free_shipping: bool,

    /// Optional single-user binding.
    pub restriction: UsageRestriction,

    /// Append-only redemption history.
    pub used_by: Vec<Redemption>,

    /// When the coupon was created.
    pub created_at: Timestamp,
}

impl Coupon {
    /// Creates a coupon after field-level validation.
    ///
    /// - the code is trimmed and uppercased; empty codes are rejected
    /// - `Percentage` requires `0 < amount <= 100`
    /// - `Shipping` forces `amount = 0` and `free_shipping = true`
    /// - `FixedCart` requires `cart_min_items >= 1`
    /// - `FixedProduct` requires a non-empty product restriction
    /// - the expiry is normalized to the end of its day
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` describing the offending field.
    pub fn create(new: NewCoupon) -> Result<Self, CouponError> {
        let code = new.code.trim().to_uppercase();
        if code.is_empty() {
            return Err(CouponError::validation("code", "cannot be empty"));
        }

        let mut amount = new.amount;
        let mut free_shipping = new.free_shipping;

        match new.kind {
            CouponKind::Percentage => {
                if amount <= 0 || amount > 100 {
                    return Err(CouponError::validation(
                        "amount",
                        "percentage discount must be between 1 and 100",
                    ));
                }
            }
            CouponKind::FixedCart => {
                if new.cart_min_items.map_or(true, |n| n < 1) {
                    return Err(CouponError::validation(
                        "cart_min_items",
                        "required and must be at least 1 for fixed cart coupons",
                    ));
                }
            }
            CouponKind::FixedProduct => {
                if new.product_restriction.is_empty() {
                    return Err(CouponError::validation(
                        "product_restriction",
                        "required for fixed product coupons",
                    ));
                }
            }
            CouponKind::Shipping => {
                amount = 0;
                free_shipping = true;
            }
        }

        if amount < 0 {
            return Err(CouponError::validation("amount", "cannot be negative"));
        }

        let mut restriction = new.restriction;
        restriction.user_email = restriction.user_email.to_lowercase();

        Ok(Self {
            id: CouponId::new(),
            code,
            kind: new.kind,
            amount,
            description: new.description,
            usage_count: 0,
            usage_limit: new.usage_limit,
            expires_at: new.expires_at.end_of_day(),
            status: CouponStatus::Active,
            min_cart_total_cents: new.min_cart_total_cents,
            max_cart_total_cents: new.max_cart_total_cents,
            allow_combine: new.allow_combine,
            exclude_sale_items: new.exclude_sale_items,
            product_restriction: new.product_restriction,
            cart_min_items: new.cart_min_items,
            free_shipping,
            restriction,
            used_by: Vec::new(),
            created_at: Timestamp::now(),
        })
    }

    /// Checks whether the coupon can be applied right now by the given
    /// purchaser. Returns the first failing rule, in a fixed order:
    /// inactive, expired, limit reached, auth required, wrong user.
    pub fn validate_for(
        &self,
        purchaser: Option<&Purchaser>,
        now: Timestamp,
    ) -> Result<(), CouponError> {
        if self.status != CouponStatus::Active {
            return Err(CouponError::inactive(&self.code));
        }

        if now.is_after(&self.expires_at) {
            return Err(CouponError::expired(&self.code));
        }

        if let Some(limit) = self.usage_limit {
            if self.usage_count >= limit {
                return Err(CouponError::limit_reached(&self.code));
            }
        }

        if self.restriction.individual_use_only {
            let purchaser = purchaser.ok_or(CouponError::AuthRequired)?;
            if purchaser.email.to_lowercase() != self.restriction.user_email.to_lowercase() {
                return Err(CouponError::Forbidden);
            }
        }

        Ok(())
    }

    /// Consumes one use of the coupon.
    ///
    /// Must only be called after the purchase has completed, so a failed
    /// payment does not burn usage.
    pub fn redeem(&mut self, user_id: UserId, email: impl Into<String>, now: Timestamp) {
        self.usage_count += 1;
        self.used_by.push(Redemption {
            user_id,
            email: email.into(),
            used_at: now,
        });
    }

    /// Marks the coupon inactive. Used by the expiry sweep.
    pub fn deactivate(&mut self) {
        self.status = CouponStatus::Inactive;
    }

    /// True once the expiry date has passed.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now.is_after(&self.expires_at)
    }

    /// Whether the coupon should appear in the public storefront list:
    /// active, shareable, unexpired, and under its usage limit.
    pub fn available_for_listing(&self, now: Timestamp) -> bool {
        self.status == CouponStatus::Active
            && !self.restriction.individual_use_only
            && !self.is_expired(now)
            && self.usage_limit.map_or(true, |limit| self.usage_count < limit)
    }

    /// Discount in cents for the given cart total.
    pub fn discount_cents(&self, cart_total_cents: i64) -> i64 {
        match self.kind {
            CouponKind::Percentage => {
                Percentage::new(self.amount.clamp(0, 100) as u8).of_cents(cart_total_cents)
            }
            CouponKind::FixedCart | CouponKind::FixedProduct => {
                self.amount.min(cart_total_cents)
            }
            CouponKind::Shipping => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn ts(s: &str) -> Timestamp {
        Timestamp::from_datetime(DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc))
    }

    fn new_coupon(kind: CouponKind, amount: i64) -> NewCoupon {
        NewCoupon {
            code: "SUMMER20".to_string(),
            kind,
            amount,
            description: String::new(),
            usage_limit: None,
            expires_at: Timestamp::now().add_days(30),
            min_cart_total_cents: 0,
            max_cart_total_cents: None,
            allow_combine: true,
            exclude_sale_items: false,
            product_restriction: vec![],
            cart_min_items: None,
            free_shipping: false,
            restriction: UsageRestriction::default(),
        }
    }

    fn purchaser(email: &str) -> Purchaser {
        Purchaser {
            user_id: UserId::new(),
            email: email.to_string(),
        }
    }

    // Creation tests

    #[test]
    fn create_normalizes_code_to_uppercase() {
        let mut spec = new_coupon(CouponKind::Percentage, 20);
        spec.code = "  summer20 ".to_string();
        let coupon = Coupon::create(spec).unwrap();
        assert_eq!(coupon.code, "SUMMER20");
    }

    #[test]
    fn create_rejects_percentage_over_100() {
        let result = Coupon::create(new_coupon(CouponKind::Percentage, 150));
        assert!(matches!(result, Err(CouponError::ValidationFailed { .. })));
    }

    #[test]
    fn create_rejects_zero_percentage() {
        assert!(Coupon::create(new_coupon(CouponKind::Percentage, 0)).is_err());
    }

    #[test]
    fn shipping_coupon_forces_amount_zero_and_free_shipping() {
        let coupon = Coupon::create(new_coupon(CouponKind::Shipping, 500)).unwrap();
        assert_eq!(coupon.amount, 0);
        assert!(coupon.free_shipping);
    }

    #[test]
    fn fixed_cart_requires_cart_min_items() {
        assert!(Coupon::create(new_coupon(CouponKind::FixedCart, 500)).is_err());

        let mut spec = new_coupon(CouponKind::FixedCart, 500);
        spec.cart_min_items = Some(1);
        assert!(Coupon::create(spec).is_ok());
    }

    #[test]
    fn fixed_product_requires_restriction() {
        assert!(Coupon::create(new_coupon(CouponKind::FixedProduct, 500)).is_err());

        let mut spec = new_coupon(CouponKind::FixedProduct, 500);
        spec.product_restriction = vec![50, 120];
        assert!(Coupon::create(spec).is_ok());
    }

    #[test]
    fn expiry_is_normalized_to_end_of_day() {
        let mut spec = new_coupon(CouponKind::Percentage, 10);
        spec.expires_at = ts("2026-09-01T08:00:00Z");
        let coupon = Coupon::create(spec).unwrap();

        // still valid late on the expiry day
        assert!(coupon.validate_for(None, ts("2026-09-01T23:00:00Z")).is_ok());
        // invalid the next day
        assert!(matches!(
            coupon.validate_for(None, ts("2026-09-02T00:30:00Z")),
            Err(CouponError::Expired(_))
        ));
    }

    // Validation ordering tests

    #[test]
    fn inactive_coupon_is_rejected() {
        let mut coupon = Coupon::create(new_coupon(CouponKind::Percentage, 10)).unwrap();
        coupon.deactivate();
        assert!(matches!(
            coupon.validate_for(None, Timestamp::now()),
            Err(CouponError::Inactive(_))
        ));
    }

    #[test]
    fn usage_limit_one_allows_single_redemption() {
        let mut spec = new_coupon(CouponKind::Percentage, 10);
        spec.usage_limit = Some(1);
        let mut coupon = Coupon::create(spec).unwrap();
        let now = Timestamp::now();

        assert!(coupon.validate_for(None, now).is_ok());
        coupon.redeem(UserId::new(), "a@x.com", now);

        assert!(matches!(
            coupon.validate_for(None, now),
            Err(CouponError::LimitReached(_))
        ));
    }

    #[test]
    fn individual_use_requires_authenticated_purchaser() {
        let mut spec = new_coupon(CouponKind::Percentage, 10);
        spec.restriction = UsageRestriction {
            individual_use_only: true,
            user_email: "a@x.com".to_string(),
            ..Default::default()
        };
        let coupon = Coupon::create(spec).unwrap();
        let now = Timestamp::now();

        assert!(matches!(
            coupon.validate_for(None, now),
            Err(CouponError::AuthRequired)
        ));
        assert!(matches!(
            coupon.validate_for(Some(&purchaser("b@x.com")), now),
            Err(CouponError::Forbidden)
        ));
        assert!(coupon.validate_for(Some(&purchaser("a@x.com")), now).is_ok());
    }

    #[test]
    fn bound_email_matches_case_insensitively() {
        let mut spec = new_coupon(CouponKind::Percentage, 10);
        spec.restriction = UsageRestriction {
            individual_use_only: true,
            user_email: "A@X.com".to_string(),
            ..Default::default()
        };
        let coupon = Coupon::create(spec).unwrap();

        assert!(coupon
            .validate_for(Some(&purchaser("a@x.COM")), Timestamp::now())
            .is_ok());
    }

    // Redemption tests

    #[test]
    fn redeem_increments_count_and_records_user() {
        let mut coupon = Coupon::create(new_coupon(CouponKind::Percentage, 10)).unwrap();
        let user = UserId::new();
        let now = Timestamp::now();

        coupon.redeem(user, "a@x.com", now);

        assert_eq!(coupon.usage_count, 1);
        assert_eq!(coupon.used_by.len(), 1);
        assert_eq!(coupon.used_by[0].user_id, user);
        assert_eq!(coupon.used_by[0].email, "a@x.com");
    }

    // Listing tests

    #[test]
    fn listing_excludes_individual_use_coupons() {
        let mut spec = new_coupon(CouponKind::Percentage, 10);
        spec.restriction.individual_use_only = true;
        spec.restriction.user_email = "a@x.com".to_string();
        let coupon = Coupon::create(spec).unwrap();

        assert!(!coupon.available_for_listing(Timestamp::now()));
    }

    #[test]
    fn listing_excludes_exhausted_coupons() {
        let mut spec = new_coupon(CouponKind::Percentage, 10);
        spec.usage_limit = Some(1);
        let mut coupon = Coupon::create(spec).unwrap();
        coupon.redeem(UserId::new(), "a@x.com", Timestamp::now());

        assert!(!coupon.available_for_listing(Timestamp::now()));
    }

    // Discount math tests

    #[test]
    fn percentage_discount_applies_to_cart_total() {
        let coupon = Coupon::create(new_coupon(CouponKind::Percentage, 20)).unwrap();
        assert_eq!(coupon.discount_cents(10_000), 2_000);
    }

    #[test]
    fn fixed_discount_never_exceeds_cart_total() {
        let mut spec = new_coupon(CouponKind::FixedCart, 5_000);
        spec.cart_min_items = Some(1);
        let coupon = Coupon::create(spec).unwrap();
        assert_eq!(coupon.discount_cents(3_000), 3_000);
        assert_eq!(coupon.discount_cents(10_000), 5_000);
    }
}
