//! Stripe adapter implementations of the `PaymentProvider` port.

mod mock_payment_provider;
mod stripe_adapter;

pub use mock_payment_provider::{MockPaymentProvider, RecordedRefund};
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter};
