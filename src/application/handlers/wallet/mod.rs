//! Wallet command handlers.

mod add_billing_method;
mod add_funds;
mod credit_overview;
mod grant_credits;
mod revoke_credits;

pub use add_billing_method::{
    AddBillingMethodCommand, AddBillingMethodHandler, AddBillingMethodResult,
};
pub use add_funds::{
    AddFundsCommand, AddFundsHandler, AddFundsResult, BillingInput, CreditLine, PaymentSelection,
};
pub use credit_overview::{CustomerCredits, GetCreditOverviewHandler};
pub use grant_credits::{GrantCreditsCommand, GrantCreditsHandler, GrantCreditsResult};
pub use revoke_credits::{RevokeCreditsCommand, RevokeCreditsHandler, RevokeCreditsResult};
