//! Pricing domain - products and time-bounded price overrides.

mod errors;
mod product;
mod schedule;

pub use errors::PricingError;
pub use product::{schedule, PackageType, Product};
pub use schedule::{PriceSchedule, ScheduleStatus};
