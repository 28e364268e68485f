//! New-task page: load pets for the selector, validate the form, submit.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

use crate::clock::{local_instant, Clock};
use crate::error::{ApiError, Field};
use crate::transport::{ApiClient, Transport};
use crate::types::{Category, NewTask, Pet, Task};

use super::{LoadTicket, ViewHandle, ViewLifetime};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Raw form fields as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskForm {
    pub title: String,
    pub pet_id: Option<i64>,
    pub category: Category,
    pub date: String,
    pub time: String,
    pub notes: String,
}

impl NewTaskForm {
    /// Empty form for `now`: today's local date and the local time rounded
    /// to the nearest five minutes.
    pub fn defaults<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let local = now.naive_local();
        let minute = i64::from(local.minute());
        let rounded_minute = (minute + 2) / 5 * 5;
        let start_of_minute = local
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(local);
        let rounded = start_of_minute + Duration::minutes(rounded_minute - minute);

        Self {
            title: String::new(),
            pet_id: None,
            category: Category::Other,
            date: rounded.format(DATE_FORMAT).to_string(),
            time: rounded.format(TIME_FORMAT).to_string(),
            notes: String::new(),
        }
    }

    /// Check fields in display order and build the payload.
    ///
    /// The date and time are read as wall-clock values in `tz`.
    pub fn validate<Tz: TimeZone>(&self, tz: &Tz) -> Result<NewTask, ApiError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ApiError::ValidationError { field: Field::Title });
        }
        let pet_id = self.pet_id.ok_or(ApiError::ValidationError { field: Field::Pet })?;

        let due_at_invalid = || ApiError::ValidationError { field: Field::DueAt };
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT)
            .map_err(|_| due_at_invalid())?;
        let time = NaiveTime::parse_from_str(self.time.trim(), TIME_FORMAT)
            .map_err(|_| due_at_invalid())?;

        Ok(NewTask {
            pet_id,
            title: title.to_string(),
            category: self.category,
            due_at: local_instant(tz, date, time).with_timezone(&Utc),
            notes: self.notes.trim().to_string(),
        })
    }
}

#[derive(Debug)]
pub struct NewTaskView<Tz: TimeZone> {
    pub pets: Vec<Pet>,
    pub loading_pets: bool,
    pub error: Option<String>,
    pub form: NewTaskForm,
    pub submitting: bool,
    tz: Tz,
    lifetime: ViewLifetime,
}

impl<Tz: TimeZone> NewTaskView<Tz> {
    pub fn new<C: Clock<Tz = Tz>>(clock: &C) -> Self {
        let now = clock.now();
        Self {
            pets: Vec::new(),
            loading_pets: true,
            error: None,
            form: NewTaskForm::defaults(&now),
            submitting: false,
            tz: now.timezone(),
            lifetime: ViewLifetime::new(),
        }
    }

    pub fn handle(&self) -> ViewHandle {
        self.lifetime.handle()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.loading_pets = true;
        self.lifetime.begin_load()
    }

    /// Store the fetched pets and preselect the first one.
    pub fn apply_pets(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Vec<Pet>, ApiError>,
    ) -> bool {
        if !self.lifetime.is_current(ticket) {
            return false;
        }
        match result {
            Ok(pets) => {
                if self.form.pet_id.is_none() {
                    self.form.pet_id = pets.first().map(|p| p.id);
                }
                self.pets = pets;
            }
            Err(e) => self.error = Some(e.message_or("Failed to load pets")),
        }
        self.loading_pets = false;
        true
    }

    pub async fn load_pets<T: Transport>(&mut self, api: &ApiClient<T>) -> bool {
        let ticket = self.begin_load();
        match ticket.run(api.list_pets()).await {
            Some(result) => self.apply_pets(&ticket, result),
            None => false,
        }
    }

    /// Validate and create the task. On success the created task is
    /// returned and the caller navigates back to the dashboard.
    pub async fn submit<T: Transport>(&mut self, api: &ApiClient<T>) -> Option<Task> {
        self.error = None;
        let input = match self.form.validate(&self.tz) {
            Ok(input) => input,
            Err(e) => {
                self.error = Some(e.to_string());
                return None;
            }
        };

        self.submitting = true;
        let ticket = self.lifetime.mutation();
        let result = ticket.run(api.create_task(&input)).await?;
        if !self.lifetime.is_mounted() {
            return None;
        }
        self.submitting = false;
        match result {
            Ok(task) => Some(task),
            Err(e) => {
                self.error = Some(e.message_or("Failed to create task"));
                None
            }
        }
    }
}
