//! Coupon persistence port.

use async_trait::async_trait;

use crate::domain::coupon::Coupon;
use crate::domain::foundation::{CouponId, DomainError, Timestamp};

/// Port for coupon persistence.
#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Persist a new coupon. Codes are unique.
    async fn save(&self, coupon: &Coupon) -> Result<(), DomainError>;

    /// Persist changes to an existing coupon.
    async fn update(&self, coupon: &Coupon) -> Result<(), DomainError>;

    /// Find a coupon by its id.
    async fn find_by_id(&self, id: &CouponId) -> Result<Option<Coupon>, DomainError>;

    /// Find a coupon by its (uppercase) code.
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, DomainError>;

    /// All coupons, for admin listing.
    async fn find_all(&self) -> Result<Vec<Coupon>, DomainError>;

    /// Bulk-deactivate every active coupon whose expiry has passed.
    /// Returns the number of coupons transitioned. Idempotent.
    async fn deactivate_expired(&self, now: Timestamp) -> Result<u64, DomainError>;
}
