//! PostgreSQL adapter implementations of the repository ports.

mod coupon_repository;
mod invoice_repository;
mod product_repository;
mod wallet_repository;

pub use coupon_repository::PostgresCouponRepository;
pub use invoice_repository::PostgresInvoiceRepository;
pub use product_repository::PostgresProductRepository;
pub use wallet_repository::PostgresWalletRepository;
