//! Dashboard: the week calendar and the "today" list.

use chrono::{DateTime, TimeZone};

use crate::calendar::{calendar_events, week_range, CalendarEvent, WeekRange, WeekStart};
use crate::clock::Clock;
use crate::error::ApiError;
use crate::today::{is_overdue, today_list};
use crate::transport::{ApiClient, Transport};
use crate::types::Task;

use super::{LoadTicket, ViewHandle, ViewLifetime};

/// One row of the "today" list, derived at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodayEntry {
    pub task: Task,
    pub overdue: bool,
}

#[derive(Debug)]
pub struct DashboardState<Tz: TimeZone> {
    /// Fixed when the page is created; a session crossing into the next
    /// week keeps showing the old one until the page is rebuilt.
    pub range: WeekRange<Tz>,
    pub tasks: Vec<Task>,
    pub events: Vec<CalendarEvent>,
    pub loading: bool,
    pub error: Option<String>,
    lifetime: ViewLifetime,
}

impl<Tz: TimeZone> DashboardState<Tz> {
    pub fn new<C: Clock<Tz = Tz>>(clock: &C, week_start: WeekStart) -> Self {
        Self {
            range: week_range(&clock.now(), week_start),
            tasks: Vec::new(),
            events: Vec::new(),
            loading: false,
            error: None,
            lifetime: ViewLifetime::new(),
        }
    }

    pub fn handle(&self) -> ViewHandle {
        self.lifetime.handle()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.loading = true;
        self.error = None;
        self.lifetime.begin_load()
    }

    /// Store a finished fetch. Returns false if the result was discarded.
    pub fn apply_tasks(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Vec<Task>, ApiError>,
    ) -> bool {
        if !self.lifetime.is_current(ticket) {
            return false;
        }
        match result {
            Ok(tasks) => {
                self.events = calendar_events(&tasks);
                self.tasks = tasks;
            }
            Err(e) => self.error = Some(e.message_or("Error")),
        }
        self.loading = false;
        true
    }

    /// Fetch the displayed week's tasks.
    pub async fn load<T: Transport>(&mut self, api: &ApiClient<T>) -> bool {
        let ticket = self.begin_load();
        let (from, to) = self.range.to_utc();
        match ticket.run(api.list_tasks(Some(from), Some(to))).await {
            Some(result) => self.apply_tasks(&ticket, result),
            None => false,
        }
    }

    /// The "today" list as of `now`, with overdue flags.
    pub fn today<Tz2: TimeZone>(&self, now: &DateTime<Tz2>) -> Vec<TodayEntry> {
        today_list(&self.tasks, now)
            .into_iter()
            .map(|task| TodayEntry {
                overdue: is_overdue(&task, now),
                task,
            })
            .collect()
    }

    /// Flip a task between pending and done, then reload.
    ///
    /// The reload is only issued once the patch has answered. A failed patch
    /// leaves its message in `error` and skips the reload.
    pub async fn toggle<T: Transport>(&mut self, api: &ApiClient<T>, task_id: i64) -> bool {
        let Some(task) = self.tasks.iter().find(|t| t.id == task_id) else {
            return false;
        };
        let next = task.status.toggled();

        let ticket = self.lifetime.mutation();
        let result = match ticket.run(api.update_task_status(task_id, next)).await {
            Some(result) => result,
            None => return false,
        };
        if !self.lifetime.is_mounted() {
            return false;
        }
        if let Err(e) = result {
            self.error = Some(e.message_or("Error"));
            return false;
        }
        self.load(api).await
    }
}
