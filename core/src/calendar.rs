//! Week boundaries and calendar events for the dashboard.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::clock::midnight;
use crate::types::{Category, Task, TaskStatus};

/// Fixed display length of a calendar event. Tasks have no stored duration.
pub const EVENT_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }
}

/// Bounds of one calendar week, both inclusive.
///
/// `end` is the last millisecond before the following week starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekRange<Tz: TimeZone> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl<Tz: TimeZone> WeekRange<Tz> {
    /// The bounds as UTC instants, ready for `list_tasks`.
    pub fn to_utc(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.start.with_timezone(&Utc), self.end.with_timezone(&Utc))
    }
}

/// The calendar week containing `now`, in `now`'s timezone.
pub fn week_range<Tz: TimeZone>(now: &DateTime<Tz>, week_start: WeekStart) -> WeekRange<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();
    let offset = (7 + today.weekday().num_days_from_monday()
        - week_start.weekday().num_days_from_monday())
        % 7;
    let first = today - Duration::days(i64::from(offset));
    let next = first + Duration::days(7);

    WeekRange {
        start: midnight(&tz, first),
        end: midnight(&tz, next) - Duration::milliseconds(1),
    }
}

/// A task laid out on the week calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: i64,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub category: Category,
    pub status: TaskStatus,
}

impl From<&Task> for CalendarEvent {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            start: task.due_at,
            end: task.due_at + Duration::minutes(EVENT_MINUTES),
            category: task.category,
            status: task.status,
        }
    }
}

pub fn calendar_events(tasks: &[Task]) -> Vec<CalendarEvent> {
    tasks.iter().map(CalendarEvent::from).collect()
}
