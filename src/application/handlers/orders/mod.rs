//! Order command handlers.

mod cancel_order;
mod create_manual_order;
mod update_manual_order;

pub use cancel_order::{CancelOrderCommand, CancelOrderHandler, CancelOrderResult, RefundType};
pub use create_manual_order::{
    CreateManualOrderCommand, CreateManualOrderHandler, CreateManualOrderResult,
};
pub use update_manual_order::{
    UpdateManualOrderCommand, UpdateManualOrderHandler, UpdateManualOrderResult,
};

use crate::domain::billing::{normalize_vat_number, OrderError, VatTreatment};
use crate::ports::VatValidator;

/// Shared VAT decision for order handlers: EU membership, optional VAT
/// number validation, then the standard treatment rules.
pub(crate) async fn resolve_vat(
    validator: &dyn VatValidator,
    country_code: &str,
    vat_number: Option<&str>,
) -> Result<VatTreatment, OrderError> {
    let country_code = country_code.to_uppercase();
    let is_eu = validator.is_eu_country(&country_code);
    let vat_number = vat_number.map(normalize_vat_number);

    let vat_valid = match (&vat_number, is_eu) {
        (Some(number), true) => validator
            .validate_vat_number(number, &country_code)
            .await
            .map_err(|err| OrderError::infrastructure(err.message))?,
        _ => false,
    };

    Ok(VatTreatment::determine(is_eu, vat_number.is_some(), vat_valid))
}
