//! Domain DTOs for the pet scheduler API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any drift between the two crates. Ids are
//! server-assigned integers; `due_at` is always a UTC instant on the wire.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    #[default]
    Dog,
    Cat,
    Bird,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Walk,
    Feed,
    Med,
    Groom,
    Vet,
    #[default]
    #[serde(other)]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Walk => "walk",
            Category::Feed => "feed",
            Category::Med => "med",
            Category::Groom => "groom",
            Category::Vet => "vet",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion state of a task. There is no third state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
}

impl TaskStatus {
    /// The status a user toggle moves to.
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Pending,
        }
    }
}

/// A pet returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub species: Species,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Payload for creating a pet, and the full-replace payload for updating
/// one. All three fields are always sent together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPet {
    pub name: String,
    pub species: Species,
    #[serde(default)]
    pub notes: String,
}

/// A scheduled, one-off task returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub pet_id: i64,
    pub title: String,
    #[serde(default)]
    pub category: Category,
    pub due_at: DateTime<Utc>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Payload for creating a task. Serialized flat; the server assigns `id`
/// and starts every task as `pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub pet_id: i64,
    pub title: String,
    pub category: Category,
    pub due_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
}

/// Body of `PATCH /tasks/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: TaskStatus,
}
