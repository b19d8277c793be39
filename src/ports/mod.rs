//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `WalletRepository`, `InvoiceRepository`, `CouponRepository`,
//!   `ProductRepository` - whole-document persistence per aggregate
//!
//! ## External Service Ports
//!
//! - `PaymentProvider` - capture and refund execution
//! - `RateSource` - base-relative currency conversion rates
//! - `VatValidator` - EU membership and VAT number checks
//! - `Notifier` - fire-and-forget user notifications

mod coupon_repository;
mod invoice_repository;
mod notifier;
mod payment_provider;
mod product_repository;
mod rate_source;
mod vat_validator;
mod wallet_repository;

pub use coupon_repository::CouponRepository;
pub use invoice_repository::InvoiceRepository;
pub use notifier::{NotificationTemplate, Notifier};
pub use payment_provider::{
    Capture, CaptureRequest, CaptureStatus, Customer, PaymentError, PaymentErrorCode,
    PaymentMethodDetails, PaymentProvider, Refund,
};
pub use product_repository::ProductRepository;
pub use rate_source::{RateError, RateSource, RateTable};
pub use vat_validator::VatValidator;
pub use wallet_repository::WalletRepository;
