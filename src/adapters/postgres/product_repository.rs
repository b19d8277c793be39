//! PostgreSQL implementation of ProductRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, ProductId, Timestamp};
use crate::domain::pricing::{PackageType, PriceSchedule, Product};
use crate::ports::ProductRepository;

/// PostgreSQL implementation of the ProductRepository port.
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    /// Creates a new PostgresProductRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a product.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    package_type: String,
    credits: i64,
    price_cents: i64,
    list_price_cents: i64,
    previous_price_cents: Option<i64>,
    description: String,
    features: Json<Vec<String>>,
    is_popular: bool,
    is_active: bool,
    schedules: Json<Vec<PriceSchedule>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[allow(dead_code)]
    version: i32,
}

impl TryFrom<ProductRow> for Product {
    type Error = DomainError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: ProductId::from_uuid(row.id),
            name: row.name,
            package_type: parse_package_type(&row.package_type)?,
            credits: row.credits,
            price_cents: row.price_cents,
            list_price_cents: row.list_price_cents,
            previous_price_cents: row.previous_price_cents,
            description: row.description,
            features: row.features.0,
            is_popular: row.is_popular,
            is_active: row.is_active,
            schedules: row.schedules.0,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_package_type(s: &str) -> Result<PackageType, DomainError> {
    match s.to_lowercase().as_str() {
        "basic" => Ok(PackageType::Basic),
        "standard" => Ok(PackageType::Standard),
        "premium" => Ok(PackageType::Premium),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid package type value: {}", s),
        )),
    }
}

const SELECT_COLUMNS: &str = "id, name, package_type, credits, price_cents, list_price_cents, \
                              previous_price_cents, description, features, is_popular, is_active, \
                              schedules, created_at, updated_at, version";

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn save(&self, product: &Product) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, package_type, credits, price_cents, list_price_cents,
                previous_price_cents, description, features, is_popular,
                is_active, schedules, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.package_type.as_str())
        .bind(product.credits)
        .bind(product.price_cents)
        .bind(product.list_price_cents)
        .bind(product.previous_price_cents)
        .bind(&product.description)
        .bind(Json(&product.features))
        .bind(product.is_popular)
        .bind(product.is_active)
        .bind(Json(&product.schedules))
        .bind(product.created_at.as_datetime())
        .bind(product.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to save product: {}", e))
        })?;

        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = $2,
                package_type = $3,
                credits = $4,
                price_cents = $5,
                list_price_cents = $6,
                previous_price_cents = $7,
                description = $8,
                features = $9,
                is_popular = $10,
                is_active = $11,
                schedules = $12,
                updated_at = $13,
                version = version + 1
            WHERE id = $1
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.package_type.as_str())
        .bind(product.credits)
        .bind(product.price_cents)
        .bind(product.list_price_cents)
        .bind(product.previous_price_cents)
        .bind(&product.description)
        .bind(Json(&product.features))
        .bind(product.is_popular)
        .bind(product.is_active)
        .bind(Json(&product.schedules))
        .bind(product.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to update product: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::ProductNotFound, "Product not found"));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find product: {}", e))
        })?;

        row.map(Product::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Product>, DomainError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to list products: {}", e))
        })?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn find_with_schedules(&self) -> Result<Vec<Product>, DomainError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE jsonb_array_length(schedules) > 0",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list scheduled products: {}", e),
            )
        })?;

        rows.into_iter().map(Product::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_package_type_works_for_all_values() {
        assert_eq!(parse_package_type("Basic").unwrap(), PackageType::Basic);
        assert_eq!(parse_package_type("standard").unwrap(), PackageType::Standard);
        assert_eq!(parse_package_type("PREMIUM").unwrap(), PackageType::Premium);
    }

    #[test]
    fn parse_package_type_rejects_invalid_values() {
        assert!(parse_package_type("deluxe").is_err());
        assert!(parse_package_type("").is_err());
    }

    #[test]
    fn roundtrip_package_type_conversion() {
        for package_type in [PackageType::Basic, PackageType::Standard, PackageType::Premium] {
            assert_eq!(parse_package_type(package_type.as_str()).unwrap(), package_type);
        }
    }
}
