//! Wall-clock source for date-dependent responses.

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, Weekday};

/// Source of the current local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    /// Today's local date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Whether today is Saturday or Sunday.
    fn is_weekend(&self) -> bool {
        matches!(self.now().weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Monday = 0 … Sunday = 6.
    fn weekday_index(&self) -> usize {
        self.now().weekday().num_days_from_monday() as usize
    }
}

/// The system's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    /// Parse an RFC 3339 timestamp, e.g. `2026-10-16T12:00:00+09:00`.
    pub fn parse(rfc3339: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(rfc3339).map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
