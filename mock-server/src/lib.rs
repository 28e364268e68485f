use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub species: String,
    pub notes: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: i64,
    pub pet_id: i64,
    pub title: String,
    pub category: String,
    pub due_at: DateTime<Utc>,
    pub status: String,
    pub notes: String,
}

#[derive(Deserialize)]
pub struct CreatePet {
    pub name: String,
    pub species: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePet {
    pub name: Option<String>,
    pub species: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateTask {
    pub pet_id: Option<i64>,
    pub title: String,
    pub category: Option<String>,
    pub due_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusBody {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct Range {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct Store {
    pets: BTreeMap<i64, Pet>,
    tasks: BTreeMap<i64, Task>,
    last_pet_id: i64,
    last_task_id: i64,
}

pub type Db = Arc<RwLock<Store>>;

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({"error": "not found"})))
}

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message})))
}

/// Routes mounted under `/api`, matching the scheduler client's default base URL.
pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let api = Router::new()
        .route("/pets", get(list_pets).post(create_pet))
        .route("/pets/{id}", get(get_pet).put(update_pet).delete(delete_pet))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", get(get_task))
        .route("/tasks/{id}/status", patch(update_status))
        .with_state(db);
    Router::new().nest("/api", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// -- pets -------------------------------------------------------------------

async fn list_pets(State(db): State<Db>) -> Json<Vec<Pet>> {
    let store = db.read().await;
    Json(store.pets.values().cloned().collect())
}

async fn create_pet(
    State(db): State<Db>,
    Json(input): Json<CreatePet>,
) -> ApiResult<(StatusCode, Json<Pet>)> {
    if input.name.trim().is_empty() {
        return Err(bad_request("name is required"));
    }
    let mut store = db.write().await;
    store.last_pet_id += 1;
    let pet = Pet {
        id: store.last_pet_id,
        name: input.name,
        species: input.species.unwrap_or_else(|| "dog".to_string()),
        notes: input.notes.unwrap_or_default(),
    };
    store.pets.insert(pet.id, pet.clone());
    log::debug!("created pet {}", pet.id);
    Ok((StatusCode::CREATED, Json(pet)))
}

async fn get_pet(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<Pet>> {
    let store = db.read().await;
    store.pets.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn update_pet(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdatePet>,
) -> ApiResult<Json<Pet>> {
    let mut store = db.write().await;
    let pet = store.pets.get_mut(&id).ok_or_else(not_found)?;
    if let Some(name) = input.name {
        pet.name = name;
    }
    if let Some(species) = input.species {
        pet.species = species;
    }
    if let Some(notes) = input.notes {
        pet.notes = notes;
    }
    Ok(Json(pet.clone()))
}

/// Removes the pet and every task that references it.
async fn delete_pet(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    store.pets.remove(&id).ok_or_else(not_found)?;
    store.tasks.retain(|_, t| t.pet_id != id);
    log::debug!("deleted pet {id} and its tasks");
    Ok(StatusCode::NO_CONTENT)
}

// -- tasks ------------------------------------------------------------------

/// Ascending by `due_at`. The range filter applies only when both bounds are
/// given, and includes both ends.
async fn list_tasks(State(db): State<Db>, Query(range): Query<Range>) -> Json<Vec<Task>> {
    let store = db.read().await;
    let mut tasks: Vec<Task> = store
        .tasks
        .values()
        .filter(|t| match (range.from, range.to) {
            (Some(from), Some(to)) => from <= t.due_at && t.due_at <= to,
            _ => true,
        })
        .cloned()
        .collect();
    tasks.sort_by_key(|t| t.due_at);
    Json(tasks)
}

async fn create_task(
    State(db): State<Db>,
    Json(input): Json<CreateTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let pet_id = input.pet_id.ok_or_else(|| bad_request("pet_id is required"))?;
    let mut store = db.write().await;
    if !store.pets.contains_key(&pet_id) {
        return Err(bad_request("pet not found"));
    }
    store.last_task_id += 1;
    let task = Task {
        id: store.last_task_id,
        pet_id,
        title: input.title,
        category: input.category.unwrap_or_else(|| "other".to_string()),
        due_at: input.due_at,
        status: "pending".to_string(),
        notes: input.notes.unwrap_or_default(),
    };
    store.tasks.insert(task.id, task.clone());
    log::debug!("created task {} for pet {pet_id}", task.id);
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<Task>> {
    let store = db.read().await;
    store.tasks.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn update_status(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<StatusBody>,
) -> ApiResult<Json<Task>> {
    let mut store = db.write().await;
    let task = store.tasks.get_mut(&id).ok_or_else(not_found)?;
    match input.status.as_deref() {
        Some(status @ ("pending" | "done")) => task.status = status.to_string(),
        _ => return Err(bad_request("invalid status")),
    }
    Ok(Json(task.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_serializes_due_at_as_utc() {
        let task = Task {
            id: 1,
            pet_id: 1,
            title: "Walk".to_string(),
            category: "walk".to_string(),
            due_at: "2025-08-20T11:00:00+02:00".parse().unwrap(),
            status: "pending".to_string(),
            notes: String::new(),
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["due_at"], "2025-08-20T09:00:00Z");
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn create_pet_fields_are_optional_except_name() {
        let input: CreatePet = serde_json::from_str(r#"{"name":"Rex"}"#).unwrap();
        assert!(input.species.is_none());
        assert!(input.notes.is_none());

        let result: Result<CreatePet, _> = serde_json::from_str(r#"{"species":"cat"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn create_task_pet_id_may_be_missing() {
        let input: CreateTask =
            serde_json::from_str(r#"{"title":"Feed","due_at":"2025-08-20T07:00:00Z"}"#).unwrap();
        assert!(input.pet_id.is_none());
        assert!(input.category.is_none());
    }

    #[test]
    fn range_query_accepts_millisecond_instants() {
        let range: Range = serde_json::from_str(
            r#"{"from":"2025-08-17T00:00:00.000Z","to":"2025-08-23T23:59:59.999Z"}"#,
        )
        .unwrap();
        assert!(range.from.unwrap() < range.to.unwrap());
    }
}
