//! PostgreSQL implementation of InvoiceRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{BillingDetails, CreditGrant, Invoice, InvoiceStatus, RefundRecord};
use crate::domain::foundation::{DomainError, ErrorCode, InvoiceId, Timestamp, UserId};
use crate::ports::InvoiceRepository;

/// PostgreSQL implementation of the InvoiceRepository port.
pub struct PostgresInvoiceRepository {
    pool: PgPool,
}

impl PostgresInvoiceRepository {
    /// Creates a new PostgresInvoiceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an invoice.
#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: Uuid,
    invoice_number: String,
    user_id: Uuid,
    credits: Json<Vec<CreditGrant>>,
    amount_cents: i64,
    vat_cents: i64,
    vat_rate: f64,
    reverse_charge: bool,
    vat_note: String,
    payment_method: String,
    total_cents: i64,
    currency: String,
    payment_ref: Option<String>,
    price_before_discount_cents: Option<i64>,
    discount_cents: i64,
    coupon_code: Option<String>,
    billing: Option<Json<BillingDetails>>,
    status: String,
    notes: String,
    issued_at: DateTime<Utc>,
    refunds: Json<Vec<RefundRecord>>,
    cancelled_at: Option<DateTime<Utc>>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = DomainError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        Ok(Invoice {
            id: InvoiceId::from_uuid(row.id),
            invoice_number: row.invoice_number,
            user_id: UserId::from_uuid(row.user_id),
            credits: row.credits.0,
            amount_cents: row.amount_cents,
            vat_cents: row.vat_cents,
            vat_rate: row.vat_rate,
            reverse_charge: row.reverse_charge,
            vat_note: row.vat_note,
            payment_method: row.payment_method,
            total_cents: row.total_cents,
            currency: row.currency,
            payment_ref: row.payment_ref,
            price_before_discount_cents: row.price_before_discount_cents,
            discount_cents: row.discount_cents,
            coupon_code: row.coupon_code,
            billing: row.billing.map(|b| b.0),
            status: parse_status(&row.status)?,
            notes: row.notes,
            issued_at: Timestamp::from_datetime(row.issued_at),
            refunds: row.refunds.0,
            cancelled_at: row.cancelled_at.map(Timestamp::from_datetime),
        })
    }
}

fn parse_status(s: &str) -> Result<InvoiceStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "pending" => Ok(InvoiceStatus::Pending),
        "paid" => Ok(InvoiceStatus::Paid),
        "completed" => Ok(InvoiceStatus::Completed),
        "cancelled" => Ok(InvoiceStatus::Cancelled),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid invoice status value: {}", s),
        )),
    }
}

const SELECT_COLUMNS: &str = "id, invoice_number, user_id, credits, amount_cents, vat_cents, \
                              vat_rate, reverse_charge, vat_note, payment_method, total_cents, \
                              currency, payment_ref, price_before_discount_cents, discount_cents, \
                              coupon_code, billing, status, notes, issued_at, refunds, cancelled_at";

#[async_trait]
impl InvoiceRepository for PostgresInvoiceRepository {
    async fn save(&self, invoice: &Invoice) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_number, user_id, credits, amount_cents, vat_cents,
                vat_rate, reverse_charge, vat_note, payment_method, total_cents,
                currency, payment_ref, price_before_discount_cents, discount_cents,
                coupon_code, billing, status, notes, issued_at, refunds, cancelled_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                      $15, $16, $17, $18, $19, $20, $21, $22)
            "#,
        )
        .bind(invoice.id.as_uuid())
        .bind(&invoice.invoice_number)
        .bind(invoice.user_id.as_uuid())
        .bind(Json(&invoice.credits))
        .bind(invoice.amount_cents)
        .bind(invoice.vat_cents)
        .bind(invoice.vat_rate)
        .bind(invoice.reverse_charge)
        .bind(&invoice.vat_note)
        .bind(&invoice.payment_method)
        .bind(invoice.total_cents)
        .bind(&invoice.currency)
        .bind(&invoice.payment_ref)
        .bind(invoice.price_before_discount_cents)
        .bind(invoice.discount_cents)
        .bind(&invoice.coupon_code)
        .bind(invoice.billing.as_ref().map(Json))
        .bind(invoice.status.as_str())
        .bind(&invoice.notes)
        .bind(invoice.issued_at.as_datetime())
        .bind(Json(&invoice.refunds))
        .bind(invoice.cancelled_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to save invoice: {}", e))
        })?;

        Ok(())
    }

    async fn update(&self, invoice: &Invoice) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                credits = $2,
                amount_cents = $3,
                vat_cents = $4,
                vat_rate = $5,
                reverse_charge = $6,
                vat_note = $7,
                payment_method = $8,
                total_cents = $9,
                billing = $10,
                status = $11,
                notes = $12,
                refunds = $13,
                cancelled_at = $14
            WHERE id = $1
            "#,
        )
        .bind(invoice.id.as_uuid())
        .bind(Json(&invoice.credits))
        .bind(invoice.amount_cents)
        .bind(invoice.vat_cents)
        .bind(invoice.vat_rate)
        .bind(invoice.reverse_charge)
        .bind(&invoice.vat_note)
        .bind(&invoice.payment_method)
        .bind(invoice.total_cents)
        .bind(invoice.billing.as_ref().map(Json))
        .bind(invoice.status.as_str())
        .bind(&invoice.notes)
        .bind(Json(&invoice.refunds))
        .bind(invoice.cancelled_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to update invoice: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::InvoiceNotFound, "Invoice not found"));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &InvoiceId) -> Result<Option<Invoice>, DomainError> {
        let row: Option<InvoiceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM invoices WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find invoice: {}", e))
        })?;

        row.map(Invoice::try_from).transpose()
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Invoice>, DomainError> {
        let rows: Vec<InvoiceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM invoices WHERE user_id = $1 ORDER BY issued_at DESC",
            SELECT_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to list invoices: {}", e))
        })?;

        rows.into_iter().map(Invoice::try_from).collect()
    }

    async fn find_all(&self) -> Result<Vec<Invoice>, DomainError> {
        let rows: Vec<InvoiceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM invoices ORDER BY issued_at DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to list invoices: {}", e))
        })?;

        rows.into_iter().map(Invoice::try_from).collect()
    }

    async fn next_invoice_number(&self) -> Result<String, DomainError> {
        let seq: i64 = sqlx::query_scalar("SELECT nextval('invoice_number_seq')")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to advance invoice sequence: {}", e),
                )
            })?;

        Ok(format!("INV-{}-{:04}", Timestamp::now().year(), seq))
    }
}
