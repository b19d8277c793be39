//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Creates a new timestamp by adding the specified number of days.
    ///
    /// Negative values subtract days.
    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Creates a new timestamp by subtracting the specified number of days.
    pub fn minus_days(&self, days: i64) -> Self {
        Self(self.0 - Duration::days(days))
    }

    /// Creates a new timestamp by adding the specified number of years.
    ///
    /// Note: Uses 365 days per year approximation.
    pub fn add_years(&self, years: i64) -> Self {
        Self(self.0 + Duration::days(years * 365))
    }

    /// Creates a new timestamp by adding the specified number of seconds.
    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0 + Duration::seconds(secs as i64))
    }

    /// Returns a copy normalized to the last millisecond of its day
    /// (23:59:59.999 UTC). Coupon expiry dates use this so a coupon stays
    /// valid through the whole calendar day it expires on.
    pub fn end_of_day(&self) -> Self {
        let end = self
            .0
            .date_naive()
            .and_hms_milli_opt(23, 59, 59, 999)
            .unwrap()
            .and_utc();
        Self(end)
    }

    /// Creates a timestamp from Unix seconds.
    pub fn from_unix_secs(secs: i64) -> Self {
        use chrono::TimeZone;
        Self(Utc.timestamp_opt(secs, 0).unwrap())
    }

    /// Returns the timestamp as Unix seconds.
    pub fn as_unix_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Returns the timestamp as Unix milliseconds.
    pub fn as_unix_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Returns the calendar year of the timestamp (UTC).
    pub fn year(&self) -> i32 {
        use chrono::Datelike;
        self.0.year()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn parse(s: &str) -> Timestamp {
        Timestamp::from_datetime(
            DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc),
        )
    }

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn timestamp_ordering_works() {
        let ts1 = parse("2026-01-15T10:30:00Z");
        let ts2 = parse("2026-01-15T10:30:01Z");

        assert!(ts1 < ts2);
        assert!(ts1.is_before(&ts2));
        assert!(ts2.is_after(&ts1));
    }

    #[test]
    fn add_days_moves_forward() {
        let ts = parse("2026-01-15T10:30:00Z");
        let later = ts.add_days(30);
        assert_eq!(later.as_datetime().day(), 14);
        assert_eq!(later.as_datetime().month(), 2);
    }

    #[test]
    fn end_of_day_normalizes_to_last_millisecond() {
        let ts = parse("2026-03-10T08:15:00Z");
        let end = ts.end_of_day();

        assert_eq!(end.as_datetime().day(), 10);
        assert_eq!(end.as_datetime().hour(), 23);
        assert_eq!(end.as_datetime().minute(), 59);
        assert_eq!(end.as_datetime().second(), 59);
    }

    #[test]
    fn end_of_day_keeps_coupon_valid_all_day() {
        let expiry = parse("2026-03-10T00:00:00Z").end_of_day();
        let late_same_day = parse("2026-03-10T22:00:00Z");
        assert!(late_same_day.is_before(&expiry));
    }

    #[test]
    fn unix_secs_roundtrips() {
        let ts = Timestamp::from_unix_secs(1705276800);
        assert_eq!(ts.as_unix_secs(), 1705276800);
        assert_eq!(ts.as_datetime().year(), 2024);
    }

    #[test]
    fn add_years_approximates_one_year() {
        let ts = parse("2026-01-15T10:30:00Z");
        let next = ts.add_years(1);
        assert_eq!(next.as_datetime().year(), 2027);
    }

    #[test]
    fn serializes_to_rfc3339_json() {
        let ts = parse("2026-01-15T10:30:00Z");
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("2026-01-15"));
    }

    #[test]
    fn deserializes_from_json() {
        let ts: Timestamp = serde_json::from_str("\"2026-01-15T10:30:00Z\"").unwrap();
        assert_eq!(ts.as_datetime().year(), 2026);
    }
}
