//! Injectable clock and local-day arithmetic.
//!
//! Every "local day" computation goes through a `chrono::TimeZone`, so tests
//! can pin both the instant and the offset.

use chrono::{
    DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
};

/// Source of "now" in some timezone.
pub trait Clock {
    type Tz: TimeZone;

    fn now(&self) -> DateTime<Self::Tz>;
}

/// The machine clock in the machine's timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock frozen at a given instant. Used in tests.
#[derive(Debug, Clone)]
pub struct FixedClock<Tz: TimeZone> {
    instant: DateTime<Tz>,
}

impl<Tz: TimeZone> FixedClock<Tz> {
    pub fn new(instant: DateTime<Tz>) -> Self {
        Self { instant }
    }

    pub fn advance(&mut self, by: Duration) {
        self.instant = self.instant.clone() + by;
    }
}

impl<Tz: TimeZone> Clock for FixedClock<Tz> {
    type Tz = Tz;

    fn now(&self) -> DateTime<Tz> {
        self.instant.clone()
    }
}

/// Map a wall-clock time in `tz` to an instant.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times inside a
/// DST gap move forward to the first valid instant after the gap.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            // Gaps are at most a few hours; probe forward minute by minute
            // from the gap and fall back to reading the wall time as UTC.
            (1..=24 * 60)
                .find_map(|m| tz.from_local_datetime(&(naive + Duration::minutes(m))).earliest())
                .unwrap_or_else(|| tz.from_utc_datetime(&naive))
        }
    }
}

/// Local midnight starting `date` in `tz`.
pub fn midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    resolve_local(tz, date.and_time(NaiveTime::MIN))
}

/// Local midnight of the day containing `instant`.
pub fn start_of_day<Tz: TimeZone>(instant: &DateTime<Tz>) -> DateTime<Tz> {
    midnight(&instant.timezone(), instant.date_naive())
}

/// Local midnight of the day after the one containing `instant`.
///
/// Computed from the calendar date, not by adding 24 hours, so DST days
/// keep their true length.
pub fn start_of_next_day<Tz: TimeZone>(instant: &DateTime<Tz>) -> DateTime<Tz> {
    let next = instant
        .date_naive()
        .succ_opt()
        .unwrap_or(NaiveDate::MAX);
    midnight(&instant.timezone(), next)
}

/// Combine a local date and time entered in a form into an instant.
pub fn local_instant<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
    resolve_local(tz, date.and_time(time))
}
