//! Stateless HTTP request builder and response parser for the pet API.
//!
//! # Design
//! `PetClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the HTTP round-trip, keeping this layer
//! deterministic and free of I/O. No client-side validation happens here.
//!
//! Failure messages differ per operation: list calls and the status patch
//! surface a fixed string, pet mutations surface the response text, and task
//! creation surfaces the text or a fallback when the body is empty.

use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{NewPet, NewTask, Pet, StatusUpdate, Task, TaskStatus};

const FETCH_PETS_FAILED: &str = "Failed to fetch pets";
const FETCH_TASKS_FAILED: &str = "Failed to fetch tasks";
const UPDATE_STATUS_FAILED: &str = "Failed to update status";
const CREATE_TASK_FAILED: &str = "Failed to create task";

/// How a non-success response turns into `ApiError::HttpError::body`.
#[derive(Debug, Clone, Copy)]
enum Failure {
    /// Ignore the body, report a fixed message.
    Fixed(&'static str),
    /// Report the response text verbatim.
    Body,
    /// Report the response text, or the fallback if it is empty.
    BodyOr(&'static str),
}

/// Synchronous, stateless client for the pet scheduler API.
#[derive(Debug, Clone)]
pub struct PetClient {
    base_url: String,
}

impl PetClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    // -- pets ---------------------------------------------------------------

    pub fn build_list_pets(&self) -> HttpRequest {
        self.bare(HttpMethod::Get, format!("{}/pets", self.base_url))
    }

    pub fn build_get_pet(&self, id: i64) -> HttpRequest {
        self.bare(HttpMethod::Get, format!("{}/pets/{id}", self.base_url))
    }

    pub fn build_create_pet(&self, input: &NewPet) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Post, format!("{}/pets", self.base_url), input)
    }

    pub fn build_update_pet(&self, id: i64, input: &NewPet) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Put, format!("{}/pets/{id}", self.base_url), input)
    }

    pub fn build_delete_pet(&self, id: i64) -> HttpRequest {
        self.bare(HttpMethod::Delete, format!("{}/pets/{id}", self.base_url))
    }

    pub fn parse_list_pets(&self, response: HttpResponse) -> Result<Vec<Pet>, ApiError> {
        check_status(&response, Failure::Fixed(FETCH_PETS_FAILED))?;
        decode(&response)
    }

    pub fn parse_get_pet(&self, response: HttpResponse) -> Result<Pet, ApiError> {
        check_status(&response, Failure::Body)?;
        decode(&response)
    }

    pub fn parse_create_pet(&self, response: HttpResponse) -> Result<Pet, ApiError> {
        check_status(&response, Failure::Body)?;
        decode(&response)
    }

    pub fn parse_update_pet(&self, response: HttpResponse) -> Result<Pet, ApiError> {
        check_status(&response, Failure::Body)?;
        decode(&response)
    }

    /// Any 2xx, including a content-less 204, counts as deleted.
    pub fn parse_delete_pet(&self, response: HttpResponse) -> Result<bool, ApiError> {
        check_status(&response, Failure::Body)?;
        Ok(true)
    }

    // -- tasks --------------------------------------------------------------

    /// The range filter is only sent when both bounds are present; the
    /// server decides inclusivity.
    pub fn build_list_tasks(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> HttpRequest {
        let mut path = format!("{}/tasks", self.base_url);
        if let (Some(from), Some(to)) = (from, to) {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("from", &iso(from))
                .append_pair("to", &iso(to))
                .finish();
            path.push('?');
            path.push_str(&query);
        }
        self.bare(HttpMethod::Get, path)
    }

    pub fn build_get_task(&self, id: i64) -> HttpRequest {
        self.bare(HttpMethod::Get, format!("{}/tasks/{id}", self.base_url))
    }

    pub fn build_create_task(&self, input: &NewTask) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Post, format!("{}/tasks", self.base_url), input)
    }

    pub fn build_update_task_status(
        &self,
        id: i64,
        status: TaskStatus,
    ) -> Result<HttpRequest, ApiError> {
        self.json(
            HttpMethod::Patch,
            format!("{}/tasks/{id}/status", self.base_url),
            &StatusUpdate { status },
        )
    }

    /// Rows that do not decode as a `Task` (e.g. an unknown status) are
    /// skipped with a warning; the rest of the list is kept.
    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<Vec<Task>, ApiError> {
        check_status(&response, Failure::Fixed(FETCH_TASKS_FAILED))?;
        let rows: Vec<serde_json::Value> = decode(&response)?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<Task>(row) {
                Ok(task) => Some(task),
                Err(e) => {
                    warn!("skipping task row: {e}");
                    None
                }
            })
            .collect())
    }

    pub fn parse_get_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        check_status(&response, Failure::Body)?;
        decode(&response)
    }

    pub fn parse_create_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        check_status(&response, Failure::BodyOr(CREATE_TASK_FAILED))?;
        decode(&response)
    }

    /// The response body is never surfaced on failure here, unlike the pet
    /// mutations.
    pub fn parse_update_task_status(&self, response: HttpResponse) -> Result<Task, ApiError> {
        check_status(&response, Failure::Fixed(UPDATE_STATUS_FAILED))?;
        decode(&response)
    }

    // -- helpers ------------------------------------------------------------

    fn bare(&self, method: HttpMethod, path: String) -> HttpRequest {
        HttpRequest {
            method,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    fn json<T: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

/// Instant as sent in query strings: millisecond precision, `Z` suffix.
pub fn iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn check_status(response: &HttpResponse, failure: Failure) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let body = match failure {
        Failure::Fixed(msg) => msg.to_string(),
        Failure::Body => response.body.clone(),
        Failure::BodyOr(fallback) if response.body.is_empty() => fallback.to_string(),
        Failure::BodyOr(_) => response.body.clone(),
    };
    Err(ApiError::HttpError {
        status: response.status,
        body,
    })
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))
}
