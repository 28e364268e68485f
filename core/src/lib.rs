//! Data-access and view-state layer for the pet-care scheduler.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for the pets
//! and tasks API without touching the network (host-does-IO pattern). An
//! async `ApiClient` drives those through a `Transport`. On top of that sit
//! the pure derived views (week range, today list, overdue flag) and the
//! per-page state structs.
//!
//! # Design
//! - `PetClient` is stateless; it holds only `base_url`.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and testable without a server.
//! - Anything that depends on "now" or on the local day takes the instant
//!   as a `chrono::DateTime<Tz>`, usually from an injected `Clock`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod calendar;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod today;
pub mod transport;
pub mod types;
pub mod views;

pub use calendar::{week_range, CalendarEvent, WeekRange, WeekStart};
pub use client::PetClient;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{ApiError, Field};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use today::{is_overdue, today_list};
pub use transport::{ApiClient, ReqwestTransport, Transport};
pub use types::{Category, NewPet, NewTask, Pet, Species, StatusUpdate, Task, TaskStatus};
