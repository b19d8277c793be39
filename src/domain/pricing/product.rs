//! Credit-package product aggregate with scheduled price overrides.
//!
//! A product's `list_price_cents` is what the storefront shows and sells
//! at. Schedules override it for a time window; `previous_price_cents`
//! snapshots the pre-override price exactly once and is restored and
//! cleared when the override ends.

use crate::domain::foundation::{Percentage, ProductId, Timestamp};
use serde::{Deserialize, Serialize};

use super::{PriceSchedule, PricingError};

/// Credit package tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackageType {
    Basic,
    Standard,
    Premium,
}

impl PackageType {
    /// Stable string form, used in persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageType::Basic => "Basic",
            PackageType::Standard => "Standard",
            PackageType::Premium => "Premium",
        }
    }
}

/// Purchasable credit package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier.
    pub id: ProductId,

    /// Display name.
    pub name: String,

    /// Package tier.
    pub package_type: PackageType,

    /// Credits granted on purchase.
    pub credits: i64,

    /// Base catalog price in cents.
    pub price_cents: i64,

    /// Effective price in cents, the one the storefront charges.
    /// Mutated by schedule activation/revert.
    pub list_price_cents: i64,

    /// Snapshot of `list_price_cents` taken before the first override;
    /// restored exactly once on revert, then cleared.
    pub previous_price_cents: Option<i64>,

    /// Marketing description.
    pub description: String,

    /// Feature bullet points.
    pub features: Vec<String>,

    /// Highlighted in the storefront.
    pub is_popular: bool,

    /// Whether the package is purchasable.
    pub is_active: bool,

    /// Scheduled price overrides, in creation order.
    pub schedules: Vec<PriceSchedule>,

    /// When the product was created.
    pub created_at: Timestamp,

    /// When the product was last updated.
    pub updated_at: Timestamp,
}

impl Product {
    /// Creates a product with no schedules; the list price starts at the
    /// catalog price.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        package_type: PackageType,
        credits: i64,
        price_cents: i64,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            name: name.into(),
            package_type,
            credits,
            price_cents,
            list_price_cents: price_cents,
            previous_price_cents: None,
            description: String::new(),
            features: Vec::new(),
            is_popular: false,
            is_active: true,
            schedules: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends a schedule entry.
    ///
    /// When the schedule carries a discount, the pre-override price is
    /// snapshotted eagerly so a later revert can restore it. The snapshot
    /// is only taken when none exists, so a still-valid earlier snapshot
    /// is never overwritten.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` for a non-positive price or an end date
    /// before the start date.
    pub fn add_schedule(&mut self, schedule: PriceSchedule) -> Result<(), PricingError> {
        if schedule.new_price_cents <= 0 {
            return Err(PricingError::validation("new_price", "must be positive"));
        }
        if let Some(end) = schedule.ends_at {
            if end.is_before(&schedule.starts_at) {
                return Err(PricingError::validation(
                    "end_date",
                    "cannot be before start date",
                ));
            }
        }

        if !schedule.discount_percent.is_zero() && self.previous_price_cents.is_none() {
            self.previous_price_cents = Some(self.list_price_cents);
        }

        self.schedules.push(schedule);
        self.touch();
        Ok(())
    }

    /// Applies due schedules and reverts expired ones for `now`.
    ///
    /// Expired schedules are handled first: the snapshotted price is
    /// restored (once) and cleared, and the schedule is deactivated for
    /// good. Then, among schedules whose window contains `now`, the one
    /// with the latest start date wins (ties fall back to the later stored
    /// position) and its discounted price becomes the list price, taking
    /// the snapshot first if none exists.
    ///
    /// Returns `true` when any field changed; callers persist only then,
    /// which makes repeated runs with no newly-due or newly-expired
    /// schedules a no-op.
    pub fn apply_schedules(&mut self, now: Timestamp) -> bool {
        let mut changed = false;

        for schedule in &mut self.schedules {
            if schedule.is_active && schedule.is_past(now) {
                if let Some(previous) = self.previous_price_cents.take() {
                    if self.list_price_cents != previous {
                        self.list_price_cents = previous;
                    }
                }
                schedule.is_active = false;
                changed = true;
            }
        }

        let winner = self
            .schedules
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_active && s.is_in_window(now))
            .max_by_key(|(index, s)| (s.starts_at, *index))
            .map(|(_, s)| s.clone());

        if let Some(schedule) = winner {
            if self.previous_price_cents.is_none() {
                self.previous_price_cents = Some(self.list_price_cents);
            }
            let final_price = schedule.effective_price_cents();
            if self.list_price_cents != final_price {
                self.list_price_cents = final_price;
                changed = true;
            }
        }

        if changed {
            self.touch();
        }
        changed
    }

    /// Removes a schedule by position.
    ///
    /// If a pre-override snapshot exists the list price reverts to it
    /// immediately and the snapshot is cleared, regardless of whether the
    /// removed schedule was the active one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidScheduleIndex` when out of range.
    pub fn remove_schedule(&mut self, index: usize) -> Result<PriceSchedule, PricingError> {
        if index >= self.schedules.len() {
            return Err(PricingError::invalid_schedule_index(index, self.schedules.len()));
        }

        let removed = self.schedules.remove(index);
        if let Some(previous) = self.previous_price_cents.take() {
            self.list_price_cents = previous;
        }
        self.touch();
        Ok(removed)
    }

    /// Whether the product holds at least one schedule entry.
    pub fn has_schedules(&self) -> bool {
        !self.schedules.is_empty()
    }

    /// Number of schedules currently flagged active.
    pub fn active_schedule_count(&self) -> usize {
        self.schedules.iter().filter(|s| s.is_active).count()
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

/// Convenience constructor for the common schedule shape.
pub fn schedule(
    new_price_cents: i64,
    discount_percent: u8,
    starts_at: Timestamp,
    ends_at: Option<Timestamp>,
    reason: &str,
) -> PriceSchedule {
    PriceSchedule::new(
        new_price_cents,
        Percentage::new(discount_percent),
        starts_at,
        ends_at,
        reason,
    )
}
