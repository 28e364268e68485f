//! Full lifecycle tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP: once synchronously with ureq executing the
//! `PetClient` requests, once through the async `ApiClient` on reqwest.

use chrono::{Duration, FixedOffset, TimeZone, Utc};
use pet_scheduler_core::views::{DashboardState, NewTaskView, PetForm, PetsView};
use pet_scheduler_core::{
    ApiClient, ApiError, Category, Clock, FixedClock, HttpMethod, HttpResponse, NewPet, NewTask,
    PetClient, ReqwestTransport, Species, TaskStatus, Transport, WeekStart,
};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
fn execute(req: pet_scheduler_core::HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(body)) => {
            agent.post(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            agent.put(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Put, None) => agent.put(&req.path).send_empty(),
        (HttpMethod::Patch, Some(body)) => {
            agent.patch(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Patch, None) => agent.patch(&req.path).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

/// Start the mock server on its own thread and return its API base URL.
fn spawn_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/api")
}

#[test]
fn crud_lifecycle() {
    let client = PetClient::new(&spawn_server());

    // Step 1: list pets — should be empty.
    let pets = client.parse_list_pets(execute(client.build_list_pets())).unwrap();
    assert!(pets.is_empty(), "expected no pets");

    // Step 2: create a pet.
    let input = NewPet {
        name: "Rex".to_string(),
        species: Species::Dog,
        notes: String::new(),
    };
    let req = client.build_create_pet(&input).unwrap();
    let rex = client.parse_create_pet(execute(req)).unwrap();
    assert_eq!(rex.name, "Rex");

    // Step 3: listing twice without a mutation is idempotent.
    let first = client.parse_list_pets(execute(client.build_list_pets())).unwrap();
    let second = client.parse_list_pets(execute(client.build_list_pets())).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, vec![rex.clone()]);

    // Step 4: full-replace update.
    let input = NewPet {
        name: "Rex".to_string(),
        species: Species::Dog,
        notes: "good boy".to_string(),
    };
    let req = client.build_update_pet(rex.id, &input).unwrap();
    let updated = client.parse_update_pet(execute(req)).unwrap();
    assert_eq!(updated.notes.as_deref(), Some("good boy"));
    let fetched = client.parse_get_pet(execute(client.build_get_pet(rex.id))).unwrap();
    assert_eq!(fetched, updated);

    // Step 5: create a task; the server assigns id and pending status.
    let due_at = Utc.with_ymd_and_hms(2025, 8, 20, 9, 0, 0).unwrap();
    let input = NewTask {
        pet_id: rex.id,
        title: "Walk".to_string(),
        category: Category::Walk,
        due_at,
        notes: String::new(),
    };
    let req = client.build_create_task(&input).unwrap();
    let task = client.parse_create_task(execute(req)).unwrap();
    assert_eq!(task.status, TaskStatus::Pending);

    // Step 6: a range covering due_at includes it; one ending before it does not.
    let req = client.build_list_tasks(Some(due_at - Duration::days(1)), Some(due_at));
    let tasks = client.parse_list_tasks(execute(req)).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, task.id);
    assert_eq!(tasks[0].pet_id, input.pet_id);
    assert_eq!(tasks[0].title, input.title);
    assert_eq!(tasks[0].category, input.category);
    assert_eq!(tasks[0].due_at, input.due_at);
    let req = client.build_list_tasks(
        Some(due_at - Duration::days(1)),
        Some(due_at - Duration::milliseconds(1)),
    );
    assert!(client.parse_list_tasks(execute(req)).unwrap().is_empty());

    // Step 7: toggle done then pending returns the task to its original state.
    let req = client.build_update_task_status(task.id, TaskStatus::Done).unwrap();
    let done = client.parse_update_task_status(execute(req)).unwrap();
    assert_eq!(done.status, TaskStatus::Done);
    let req = client.build_update_task_status(task.id, TaskStatus::Pending).unwrap();
    let back = client.parse_update_task_status(execute(req)).unwrap();
    assert_eq!(back, task);

    // Step 8: a task for a missing pet is rejected with the server's text.
    let bad = NewTask { pet_id: 999, ..input.clone() };
    let err = client
        .parse_create_task(execute(client.build_create_task(&bad).unwrap()))
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("pet not found"));

    // Step 9: deleting the pet cascades to its tasks.
    assert!(client.parse_delete_pet(execute(client.build_delete_pet(rex.id))).unwrap());
    let tasks = client.parse_list_tasks(execute(client.build_list_tasks(None, None))).unwrap();
    assert!(tasks.iter().all(|t| t.pet_id != rex.id));
    let err = client.parse_get_task(execute(client.build_get_task(task.id))).unwrap_err();
    assert!(err.is_not_found());

    // Step 10: delete again — not found, body surfaced.
    let err = client
        .parse_delete_pet(execute(client.build_delete_pet(rex.id)))
        .unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 404, .. }));
    assert!(err.to_string().contains("not found"));

    // Step 11: status patch on the deleted task keeps the generic message.
    let req = client.build_update_task_status(task.id, TaskStatus::Done).unwrap();
    let err = client.parse_update_task_status(execute(req)).unwrap_err();
    assert_eq!(err.to_string(), "Failed to update status");
}

#[tokio::test(flavor = "multi_thread")]
async fn pages_against_live_server() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));

    let client = PetClient::new(&format!("http://{addr}/api"));
    let api = ApiClient::new(client.clone(), ReqwestTransport::default());
    let raw = api
        .transport()
        .execute(client.build_list_pets())
        .await
        .unwrap();
    assert_eq!(raw.status, 200);
    assert_eq!(raw.body, "[]");
    assert!(raw.headers.is_empty());

    let tz = FixedOffset::east_opt(2 * 3600).unwrap();
    let mut clock = FixedClock::new(tz.with_ymd_and_hms(2025, 8, 20, 8, 0, 0).unwrap());

    // Pets page: create one pet.
    let mut pets = PetsView::new();
    assert!(pets.load(&api).await);
    assert!(pets.pets.is_empty());
    pets.draft = PetForm {
        name: "Mia".to_string(),
        species: Species::Cat,
        notes: String::new(),
    };
    assert!(pets.create(&api).await);
    assert_eq!(pets.pets.len(), 1);
    let mia = pets.pets[0].clone();

    // New task page: 09:00 local today, for the preselected pet.
    let mut new_task = NewTaskView::new(&clock);
    assert!(new_task.load_pets(&api).await);
    assert_eq!(new_task.form.pet_id, Some(mia.id));
    new_task.form.title = "Pill".to_string();
    new_task.form.category = Category::Med;
    new_task.form.time = "09:00".to_string();
    let created = new_task.submit(&api).await.expect("task created");
    assert_eq!(created.due_at, Utc.with_ymd_and_hms(2025, 8, 20, 7, 0, 0).unwrap());

    // Dashboard: task shows up today, overdue once its time has passed.
    let mut dashboard = DashboardState::new(&clock, WeekStart::Monday);
    assert!(dashboard.load(&api).await);
    assert!(dashboard.error.is_none());
    assert_eq!(dashboard.events.len(), 1);
    let today = dashboard.today(&clock.now());
    assert_eq!(today.len(), 1);
    assert!(!today[0].overdue);

    clock.advance(Duration::hours(6));
    let today = dashboard.today(&clock.now());
    assert!(today[0].overdue);

    assert!(dashboard.toggle(&api, created.id).await);
    let today = dashboard.today(&clock.now());
    assert_eq!(today[0].task.status, TaskStatus::Done);
    assert!(!today[0].overdue);

    // Deleting the pet empties the dashboard after a reload.
    assert!(pets.delete(&api, mia.id).await);
    assert!(dashboard.load(&api).await);
    assert!(dashboard.tasks.is_empty());
}

#[tokio::test]
async fn unreachable_server_is_a_network_failure() {
    // Bind then drop to get a port nothing listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let api = ApiClient::new(
        PetClient::new(&format!("http://127.0.0.1:{port}/api")),
        ReqwestTransport::default(),
    );
    let err = api.list_pets().await.unwrap_err();
    assert!(matches!(err, ApiError::NetworkFailure(_)));
    assert!(err.is_retryable());
}
