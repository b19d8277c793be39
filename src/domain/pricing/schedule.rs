//! Time-bounded price schedule entries.

use crate::domain::foundation::{Percentage, Timestamp};
use serde::{Deserialize, Serialize};

/// Lifecycle of a schedule relative to a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Start date has not arrived yet.
    Scheduled,

    /// Within the start/end window and still active.
    Active,

    /// End date has passed.
    Expired,
}

/// A scheduled override of a product's effective price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSchedule {
    /// Price in cents the override applies.
    pub new_price_cents: i64,

    /// Additional discount applied on top of `new_price_cents`.
    pub discount_percent: Percentage,

    /// When the override starts applying.
    pub starts_at: Timestamp,

    /// When the override ends; `None` = open-ended.
    pub ends_at: Option<Timestamp>,

    /// Human reason, e.g. "Black Friday Sale".
    pub reason: String,

    /// Cleared when the schedule expires and is reverted. Never
    /// reactivated.
    pub is_active: bool,
}

impl PriceSchedule {
    pub fn new(
        new_price_cents: i64,
        discount_percent: Percentage,
        starts_at: Timestamp,
        ends_at: Option<Timestamp>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            new_price_cents,
            discount_percent,
            starts_at,
            ends_at,
            reason: reason.into(),
            is_active: true,
        }
    }

    /// The price this schedule yields: `new_price` minus its discount,
    /// rounded to the cent.
    pub fn effective_price_cents(&self) -> i64 {
        self.new_price_cents - self.discount_percent.of_cents(self.new_price_cents)
    }

    /// Whether `now` falls inside the start/end window.
    pub fn is_in_window(&self, now: Timestamp) -> bool {
        if self.starts_at.is_after(&now) {
            return false;
        }
        match self.ends_at {
            Some(end) => !now.is_after(&end),
            None => true,
        }
    }

    /// Whether the end date has passed.
    pub fn is_past(&self, now: Timestamp) -> bool {
        matches!(self.ends_at, Some(end) if now.is_after(&end))
    }

    /// Status of the schedule at `now`, for admin listings.
    pub fn status_at(&self, now: Timestamp) -> ScheduleStatus {
        if self.is_past(now) {
            ScheduleStatus::Expired
        } else if self.is_active && self.is_in_window(now) {
            ScheduleStatus::Active
        } else {
            ScheduleStatus::Scheduled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn ts(s: &str) -> Timestamp {
        Timestamp::from_datetime(DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc))
    }

    #[test]
    fn effective_price_applies_discount() {
        // 10% off €100.00 -> €90.00
        let schedule = PriceSchedule::new(10_000, Percentage::new(10), ts("2026-01-01T00:00:00Z"), None, "sale");
        assert_eq!(schedule.effective_price_cents(), 9_000);
    }

    #[test]
    fn effective_price_without_discount_is_new_price() {
        let schedule = PriceSchedule::new(6_500, Percentage::ZERO, ts("2026-01-01T00:00:00Z"), None, "");
        assert_eq!(schedule.effective_price_cents(), 6_500);
    }

    #[test]
    fn window_checks_respect_open_end() {
        let schedule = PriceSchedule::new(6_500, Percentage::ZERO, ts("2026-01-01T00:00:00Z"), None, "");
        assert!(!schedule.is_in_window(ts("2025-12-31T23:59:59Z")));
        assert!(schedule.is_in_window(ts("2026-01-01T00:00:00Z")));
        assert!(schedule.is_in_window(ts("2030-01-01T00:00:00Z")));
        assert!(!schedule.is_past(ts("2030-01-01T00:00:00Z")));
    }

    #[test]
    fn status_transitions_over_time() {
        let schedule = PriceSchedule::new(
            6_500,
            Percentage::ZERO,
            ts("2026-02-01T00:00:00Z"),
            Some(ts("2026-02-28T23:59:59Z")),
            "",
        );

        assert_eq!(schedule.status_at(ts("2026-01-15T00:00:00Z")), ScheduleStatus::Scheduled);
        assert_eq!(schedule.status_at(ts("2026-02-15T00:00:00Z")), ScheduleStatus::Active);
        assert_eq!(schedule.status_at(ts("2026-03-01T00:00:00Z")), ScheduleStatus::Expired);
    }
}
