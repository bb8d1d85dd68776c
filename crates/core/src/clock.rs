use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

/// Source of "now" for record timestamps and of the clinic's current date.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date at the clinic.
    fn today(&self) -> NaiveDate;
}

/// Wall clock, with the clinic's UTC offset applied for [`Clock::today`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Builds a clock from a whole-hour offset; out-of-range values fall back
    /// to UTC.
    pub fn with_offset_hours(hours: i32) -> Self {
        let offset = FixedOffset::east_opt(hours * 3600).unwrap_or_else(utc_offset);
        Self { offset }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(utc_offset())
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Noon UTC on `date`.
    pub fn on(date: NaiveDate) -> Self {
        let noon = date.and_time(NaiveTime::MIN) + Duration::hours(12);
        Self::at(Utc.from_utc_datetime(&noon))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}
