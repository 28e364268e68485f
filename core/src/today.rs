//! The "today" list and overdue rule.
//!
//! Both are pure functions of the task set and the current instant. They are
//! meant to be re-run on every render; nothing here caches.

use chrono::{DateTime, TimeZone, Utc};

use crate::clock::{start_of_day, start_of_next_day};
use crate::types::{Task, TaskStatus};

/// Tasks due in `[local midnight of now, next local midnight)`, ascending by
/// `due_at`. Equal timestamps keep their input order.
pub fn today_list<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> Vec<Task> {
    let start = start_of_day(now).with_timezone(&Utc);
    let end = start_of_next_day(now).with_timezone(&Utc);

    let mut today: Vec<Task> = tasks
        .iter()
        .filter(|t| start <= t.due_at && t.due_at < end)
        .cloned()
        .collect();
    today.sort_by_key(|t| t.due_at);
    today
}

/// A pending task whose due instant has passed. Done tasks are never overdue.
pub fn is_overdue<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> bool {
    task.status == TaskStatus::Pending && task.due_at < now.with_timezone(&Utc)
}
