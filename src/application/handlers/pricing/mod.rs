//! Pricing command handlers.

mod apply_scheduled_changes;
mod delete_schedule;
mod list_schedules;
mod prices_in_currency;
mod schedule_price_change;

pub use apply_scheduled_changes::{ApplyScheduledChangesHandler, ApplyScheduledChangesResult};
pub use delete_schedule::{DeleteScheduleCommand, DeleteScheduleHandler, DeleteScheduleResult};
pub use list_schedules::{ListSchedulesHandler, ScheduleSummary};
pub use prices_in_currency::{LocalizedPrice, PricesInCurrencyHandler};
pub use schedule_price_change::{SchedulePriceChangeCommand, SchedulePriceChangeHandler};
