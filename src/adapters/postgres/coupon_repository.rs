//! PostgreSQL implementation of CouponRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::coupon::{Coupon, CouponKind, CouponStatus, Redemption, UsageRestriction};
use crate::domain::foundation::{CouponId, DomainError, ErrorCode, Timestamp};
use crate::ports::CouponRepository;

/// PostgreSQL implementation of the CouponRepository port.
pub struct PostgresCouponRepository {
    pool: PgPool,
}

impl PostgresCouponRepository {
    /// Creates a new PostgresCouponRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a coupon.
#[derive(Debug, sqlx::FromRow)]
struct CouponRow {
    id: Uuid,
    code: String,
    kind: String,
    amount: i64,
    description: String,
    usage_count: i32,
    usage_limit: Option<i32>,
    expires_at: DateTime<Utc>,
    status: String,
    min_cart_total_cents: i64,
    max_cart_total_cents: Option<i64>,
    allow_combine: bool,
    exclude_sale_items: bool,
    product_restriction: Json<Vec<i64>>,
    cart_min_items: Option<i32>,
    free_shipping: bool,
    restriction: Json<UsageRestriction>,
    used_by: Json<Vec<Redemption>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = DomainError;

    fn try_from(row: CouponRow) -> Result<Self, Self::Error> {
        Ok(Coupon {
            id: CouponId::from_uuid(row.id),
            code: row.code,
            kind: parse_kind(&row.kind)?,
            amount: row.amount,
            description: row.description,
            usage_count: row.usage_count as u32,
            usage_limit: row.usage_limit.map(|limit| limit as u32),
            expires_at: Timestamp::from_datetime(row.expires_at),
            status: parse_status(&row.status)?,
            min_cart_total_cents: row.min_cart_total_cents,
            max_cart_total_cents: row.max_cart_total_cents,
            allow_combine: row.allow_combine,
            exclude_sale_items: row.exclude_sale_items,
            product_restriction: row.product_restriction.0,
            cart_min_items: row.cart_min_items.map(|n| n as u32),
            free_shipping: row.free_shipping,
            restriction: row.restriction.0,
            used_by: row.used_by.0,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn parse_kind(s: &str) -> Result<CouponKind, DomainError> {
    match s.to_lowercase().as_str() {
        "percentage" => Ok(CouponKind::Percentage),
        "fixed_cart" => Ok(CouponKind::FixedCart),
        "fixed_product" => Ok(CouponKind::FixedProduct),
        "shipping" => Ok(CouponKind::Shipping),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid coupon kind value: {}", s),
        )),
    }
}

fn parse_status(s: &str) -> Result<CouponStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "active" => Ok(CouponStatus::Active),
        "inactive" => Ok(CouponStatus::Inactive),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid coupon status value: {}", s),
        )),
    }
}

fn status_to_string(status: &CouponStatus) -> &'static str {
    match status {
        CouponStatus::Active => "active",
        CouponStatus::Inactive => "inactive",
    }
}

const SELECT_COLUMNS: &str = "id, code, kind, amount, description, usage_count, usage_limit, \
                              expires_at, status, min_cart_total_cents, max_cart_total_cents, \
                              allow_combine, exclude_sale_items, product_restriction, \
                              cart_min_items, free_shipping, restriction, used_by, created_at";

#[async_trait]
impl CouponRepository for PostgresCouponRepository {
    async fn save(&self, coupon: &Coupon) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO coupons (
                id, code, kind, amount, description, usage_count, usage_limit,
                expires_at, status, min_cart_total_cents, max_cart_total_cents,
                allow_combine, exclude_sale_items, product_restriction,
                cart_min_items, free_shipping, restriction, used_by, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                      $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(coupon.id.as_uuid())
        .bind(&coupon.code)
        .bind(coupon.kind.as_str())
        .bind(coupon.amount)
        .bind(&coupon.description)
        .bind(coupon.usage_count as i32)
        .bind(coupon.usage_limit.map(|limit| limit as i32))
        .bind(coupon.expires_at.as_datetime())
        .bind(status_to_string(&coupon.status))
        .bind(coupon.min_cart_total_cents)
        .bind(coupon.max_cart_total_cents)
        .bind(coupon.allow_combine)
        .bind(coupon.exclude_sale_items)
        .bind(Json(&coupon.product_restriction))
        .bind(coupon.cart_min_items.map(|n| n as i32))
        .bind(coupon.free_shipping)
        .bind(Json(&coupon.restriction))
        .bind(Json(&coupon.used_by))
        .bind(coupon.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("coupons_code_key") {
                    return DomainError::new(
                        ErrorCode::DuplicateCoupon,
                        "Coupon code already exists",
                    );
                }
            }
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to save coupon: {}", e))
        })?;

        Ok(())
    }

    async fn update(&self, coupon: &Coupon) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE coupons SET
                amount = $2,
                description = $3,
                usage_count = $4,
                usage_limit = $5,
                expires_at = $6,
                status = $7,
                restriction = $8,
                used_by = $9
            WHERE id = $1
            "#,
        )
        .bind(coupon.id.as_uuid())
        .bind(coupon.amount)
        .bind(&coupon.description)
        .bind(coupon.usage_count as i32)
        .bind(coupon.usage_limit.map(|limit| limit as i32))
        .bind(coupon.expires_at.as_datetime())
        .bind(status_to_string(&coupon.status))
        .bind(Json(&coupon.restriction))
        .bind(Json(&coupon.used_by))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to update coupon: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::CouponNotFound, "Coupon not found"));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &CouponId) -> Result<Option<Coupon>, DomainError> {
        let row: Option<CouponRow> = sqlx::query_as(&format!(
            "SELECT {} FROM coupons WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find coupon: {}", e))
        })?;

        row.map(Coupon::try_from).transpose()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, DomainError> {
        let row: Option<CouponRow> = sqlx::query_as(&format!(
            "SELECT {} FROM coupons WHERE code = $1",
            SELECT_COLUMNS
        ))
        .bind(code.trim().to_uppercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find coupon: {}", e))
        })?;

        row.map(Coupon::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Coupon>, DomainError> {
        let rows: Vec<CouponRow> = sqlx::query_as(&format!(
            "SELECT {} FROM coupons ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to list coupons: {}", e))
        })?;

        rows.into_iter().map(Coupon::try_from).collect()
    }

    async fn deactivate_expired(&self, now: Timestamp) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "UPDATE coupons SET status = 'inactive' WHERE status = 'active' AND expires_at < $1",
        )
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to expire coupons: {}", e),
            )
        })?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kind_works_for_all_values() {
        assert_eq!(parse_kind("percentage").unwrap(), CouponKind::Percentage);
        assert_eq!(parse_kind("fixed_cart").unwrap(), CouponKind::FixedCart);
        assert_eq!(parse_kind("fixed_product").unwrap(), CouponKind::FixedProduct);
        assert_eq!(parse_kind("shipping").unwrap(), CouponKind::Shipping);
    }

    #[test]
    fn parse_kind_rejects_invalid_values() {
        assert!(parse_kind("bogo").is_err());
        assert!(parse_kind("").is_err());
    }

    #[test]
    fn roundtrip_kind_conversion() {
        for kind in [
            CouponKind::Percentage,
            CouponKind::FixedCart,
            CouponKind::FixedProduct,
            CouponKind::Shipping,
        ] {
            assert_eq!(parse_kind(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn roundtrip_status_conversion() {
        for status in [CouponStatus::Active, CouponStatus::Inactive] {
            assert_eq!(parse_status(status_to_string(&status)).unwrap(), status);
        }
    }
}
