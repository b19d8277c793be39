//! EU VAT treatment for purchases.
//!
//! Three outcomes, decided from the billing country and an optionally
//! validated VAT number:
//!
//! - validated intra-EU business: reverse charge, 0% charged
//! - EU consumer (or unvalidated VAT number): standard 21% rate
//! - outside the EU: exempt export of services

use serde::{Deserialize, Serialize};

/// Standard VAT rate applied to EU consumers, as a fraction.
pub const STANDARD_VAT_RATE: f64 = 0.21;

/// Legal note attached to reverse-charged invoices.
pub const REVERSE_CHARGE_NOTE: &str =
    "VAT reverse charged pursuant to Article 138 of Directive 2006/112/EC";

/// Legal note attached to non-EU exports.
pub const EXPORT_EXEMPT_NOTE: &str =
    "VAT-exempt export of services outside the EU - Article 6(2) Dutch VAT Act";

/// Resolved VAT treatment for one purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatTreatment {
    /// VAT rate as a fraction (0.21 = 21%).
    pub rate: f64,

    /// Whether VAT liability shifts to the purchaser.
    pub reverse_charge: bool,

    /// Legal note to print on the invoice, if any.
    pub note: String,
}

impl VatTreatment {
    /// Decides the treatment from the purchaser's location and VAT number
    /// validity. `vat_number_valid` is only meaningful when a VAT number
    /// was supplied.
    pub fn determine(is_eu: bool, vat_number_supplied: bool, vat_number_valid: bool) -> Self {
        if !is_eu {
            return Self {
                rate: 0.0,
                reverse_charge: false,
                note: EXPORT_EXEMPT_NOTE.to_string(),
            };
        }

        if vat_number_supplied && vat_number_valid {
            return Self {
                rate: 0.0,
                reverse_charge: true,
                note: REVERSE_CHARGE_NOTE.to_string(),
            };
        }

        Self {
            rate: STANDARD_VAT_RATE,
            reverse_charge: false,
            note: String::new(),
        }
    }

    /// VAT amount in cents for a subtotal, rounded to the nearest cent.
    pub fn vat_cents(&self, amount_cents: i64) -> i64 {
        (amount_cents as f64 * self.rate).round() as i64
    }
}

/// Uppercases and trims a VAT number for validation and storage.
pub fn normalize_vat_number(vat_number: &str) -> String {
    vat_number.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validated_eu_business_gets_reverse_charge() {
        let treatment = VatTreatment::determine(true, true, true);
        assert_eq!(treatment.rate, 0.0);
        assert!(treatment.reverse_charge);
        assert_eq!(treatment.note, REVERSE_CHARGE_NOTE);
    }

    #[test]
    fn eu_consumer_pays_standard_rate() {
        let treatment = VatTreatment::determine(true, false, false);
        assert_eq!(treatment.rate, STANDARD_VAT_RATE);
        assert!(!treatment.reverse_charge);
    }

    #[test]
    fn invalid_vat_number_is_treated_as_consumer() {
        let treatment = VatTreatment::determine(true, true, false);
        assert_eq!(treatment.rate, STANDARD_VAT_RATE);
        assert!(!treatment.reverse_charge);
    }

    #[test]
    fn outside_eu_is_exempt() {
        let treatment = VatTreatment::determine(false, false, false);
        assert_eq!(treatment.rate, 0.0);
        assert!(!treatment.reverse_charge);
        assert_eq!(treatment.note, EXPORT_EXEMPT_NOTE);
    }

    #[test]
    fn vat_cents_rounds_to_nearest_cent() {
        let treatment = VatTreatment::determine(true, false, false);
        // 21% of €33.33 -> 699.93 cents -> 700
        assert_eq!(treatment.vat_cents(3_333), 700);
        // 21% of €100.00
        assert_eq!(treatment.vat_cents(10_000), 2_100);
    }

    #[test]
    fn normalize_uppercases_and_trims() {
        assert_eq!(normalize_vat_number(" nl123456789b01 "), "NL123456789B01");
    }
}
