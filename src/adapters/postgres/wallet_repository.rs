//! PostgreSQL implementation of WalletRepository.
//!
//! The wallet row holds scalar columns for the balances and JSONB columns
//! for the nested card and ledger collections, matching the
//! whole-document persistence model of the port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId, WalletId};
use crate::domain::wallet::{LedgerEntry, SavedCard, Wallet};
use crate::ports::WalletRepository;

/// PostgreSQL implementation of the WalletRepository port.
pub struct PostgresWalletRepository {
    pool: PgPool,
}

impl PostgresWalletRepository {
    /// Creates a new PostgresWalletRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a wallet.
#[derive(Debug, sqlx::FromRow)]
struct WalletRow {
    id: Uuid,
    user_id: Uuid,
    balance: i64,
    total_purchased: i64,
    customer_ref: Option<String>,
    cards: Json<Vec<SavedCard>>,
    ledger: Json<Vec<LedgerEntry>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[allow(dead_code)]
    version: i32,
}

impl From<WalletRow> for Wallet {
    fn from(row: WalletRow) -> Self {
        Wallet {
            id: WalletId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            balance: row.balance,
            total_purchased: row.total_purchased,
            customer_ref: row.customer_ref,
            cards: row.cards.0,
            ledger: row.ledger.0,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        }
    }
}

const SELECT_COLUMNS: &str = "id, user_id, balance, total_purchased, customer_ref, \
                              cards, ledger, created_at, updated_at, version";

#[async_trait]
impl WalletRepository for PostgresWalletRepository {
    async fn save(&self, wallet: &Wallet) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO wallets (
                id, user_id, balance, total_purchased, customer_ref,
                cards, ledger, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(wallet.id.as_uuid())
        .bind(wallet.user_id.as_uuid())
        .bind(wallet.balance)
        .bind(wallet.total_purchased)
        .bind(&wallet.customer_ref)
        .bind(Json(&wallet.cards))
        .bind(Json(&wallet.ledger))
        .bind(wallet.created_at.as_datetime())
        .bind(wallet.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("wallets_user_id_key") {
                    return DomainError::new(
                        ErrorCode::DatabaseError,
                        "User already has a wallet",
                    );
                }
            }
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to save wallet: {}", e))
        })?;

        Ok(())
    }

    async fn update(&self, wallet: &Wallet) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE wallets SET
                balance = $2,
                total_purchased = $3,
                customer_ref = $4,
                cards = $5,
                ledger = $6,
                updated_at = $7,
                version = version + 1
            WHERE id = $1
            "#,
        )
        .bind(wallet.id.as_uuid())
        .bind(wallet.balance)
        .bind(wallet.total_purchased)
        .bind(&wallet.customer_ref)
        .bind(Json(&wallet.cards))
        .bind(Json(&wallet.ledger))
        .bind(wallet.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to update wallet: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::WalletNotFound, "Wallet not found"));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &WalletId) -> Result<Option<Wallet>, DomainError> {
        let row: Option<WalletRow> = sqlx::query_as(&format!(
            "SELECT {} FROM wallets WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find wallet: {}", e))
        })?;

        Ok(row.map(Wallet::from))
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Wallet>, DomainError> {
        let row: Option<WalletRow> = sqlx::query_as(&format!(
            "SELECT {} FROM wallets WHERE user_id = $1",
            SELECT_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find wallet: {}", e))
        })?;

        Ok(row.map(Wallet::from))
    }

    async fn find_all(&self) -> Result<Vec<Wallet>, DomainError> {
        let rows: Vec<WalletRow> = sqlx::query_as(&format!(
            "SELECT {} FROM wallets ORDER BY created_at ASC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to list wallets: {}", e))
        })?;

        Ok(rows.into_iter().map(Wallet::from).collect())
    }
}
