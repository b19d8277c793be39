//! VAT validation adapter implementing the `VatValidator` port.

mod vies_client;

pub use vies_client::ViesVatValidator;
