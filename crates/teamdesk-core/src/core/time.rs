// crates/teamdesk-core/src/core/time.rs
// ============================================================================
// Module: Teamdesk Time Model
// Description: Canonical timestamps and clock sources.
// Purpose: Keep expiry and TTL decisions deterministic and testable.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Teamdesk records every instant as unix epoch milliseconds. The core never
//! reads wall-clock time directly; hosts supply a [`Clock`] so invite expiry
//! and cache TTL checks can be driven explicitly in tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;
use time::Date;
use time::Month;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Milliseconds in one day.
const MILLIS_PER_DAY: i64 = 86_400_000;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Unix epoch timestamp in milliseconds.
///
/// # Invariants
/// - Values are supplied by a [`Clock`] or parsed from caller input.
/// - No monotonicity is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Returns the timestamp advanced by the duration (saturating).
    #[must_use]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let millis = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        Self(self.0.saturating_add(millis))
    }

    /// Returns the timestamp advanced by whole days (saturating).
    #[must_use]
    pub const fn plus_days(self, days: u32) -> Self {
        Self(self.0.saturating_add(MILLIS_PER_DAY.saturating_mul(days as i64)))
    }

    /// Parses an RFC 3339 date-time string.
    ///
    /// Returns `None` when the value does not parse, mirroring lenient query
    /// filters that ignore malformed dates.
    #[must_use]
    pub fn parse_rfc3339(value: &str) -> Option<Self> {
        let parsed = OffsetDateTime::parse(value.trim(), &Rfc3339).ok()?;
        let millis = parsed.unix_timestamp_nanos() / 1_000_000;
        i64::try_from(millis).ok().map(Self)
    }

    /// Parses an RFC 3339 date-time or a bare `YYYY-MM-DD` calendar date.
    ///
    /// Calendar dates resolve to midnight UTC.
    #[must_use]
    pub fn parse_date_or_datetime(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(parsed) = Self::parse_rfc3339(value) {
            return Some(parsed);
        }
        let mut parts = value.splitn(3, '-');
        let year: i32 = parts.next()?.parse().ok()?;
        let month: u8 = parts.next()?.parse().ok()?;
        let day: u8 = parts.next()?.parse().ok()?;
        let date = Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()?;
        let seconds = date.midnight().assume_utc().unix_timestamp();
        Some(Self(seconds.saturating_mul(1_000)))
    }
}

// ============================================================================
// SECTION: Clocks
// ============================================================================

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current timestamp.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        Timestamp(millis)
    }
}

/// Manually advanced clock for tests and replay.
///
/// # Invariants
/// - Clones share the same underlying instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    /// Current time in unix milliseconds.
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// Creates a clock fixed at the provided instant.
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start.as_unix_millis())),
        }
    }

    /// Advances the clock by the duration.
    pub fn advance(&self, duration: Duration) {
        let millis = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    /// Sets the clock to an explicit instant.
    pub fn set(&self, instant: Timestamp) {
        self.now.store(instant.as_unix_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.load(Ordering::SeqCst))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use std::time::Duration;

    use super::Clock;
    use super::ManualClock;
    use super::Timestamp;

    #[test]
    fn parse_rfc3339_accepts_utc_and_offsets() {
        let utc = Timestamp::parse_rfc3339("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(utc.as_unix_millis(), 1_704_067_200_000);
        let offset = Timestamp::parse_rfc3339("2024-01-01T01:00:00+01:00").unwrap();
        assert_eq!(offset, utc);
    }

    #[test]
    fn parse_rfc3339_rejects_garbage() {
        assert!(Timestamp::parse_rfc3339("not-a-date").is_none());
        assert!(Timestamp::parse_rfc3339("").is_none());
    }

    #[test]
    fn calendar_dates_resolve_to_midnight_utc() {
        let date = Timestamp::parse_date_or_datetime("2024-01-01").unwrap();
        assert_eq!(date.as_unix_millis(), 1_704_067_200_000);
        assert!(Timestamp::parse_date_or_datetime("2024-13-01").is_none());
        assert!(Timestamp::parse_date_or_datetime("tomorrow").is_none());
    }

    #[test]
    fn manual_clock_advances_shared_instant() {
        let clock = ManualClock::new(Timestamp::from_unix_millis(1_000));
        let shared = clock.clone();
        clock.advance(Duration::from_millis(500));
        assert_eq!(shared.now(), Timestamp::from_unix_millis(1_500));
    }

    #[test]
    fn plus_days_adds_whole_days() {
        let start = Timestamp::from_unix_millis(0);
        assert_eq!(start.plus_days(7).as_unix_millis(), 7 * 86_400_000);
    }
}
