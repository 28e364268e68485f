//! Async execution of `PetClient` requests.
//!
//! # Design
//! `Transport` is the only place that does I/O. `ApiClient` pairs it with a
//! `PetClient`: build the request, hand it to the transport, parse the
//! response. One attempt per call; a failure goes straight back to the
//! caller. Transport-level failures (connect, timeout, reset) all become
//! `ApiError::NetworkFailure`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::client::PetClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{NewPet, NewTask, Pet, Task, TaskStatus};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `Transport` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

fn to_reqwest(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = self.http.request(to_reqwest(request.method), &request.path);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::NetworkFailure(e.to_string()))?;
        let status = response.status().as_u16();
        // Parsers only look at status and body.
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::NetworkFailure(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

/// Async client for the pet scheduler API.
#[derive(Debug, Clone)]
pub struct ApiClient<T = ReqwestTransport> {
    client: PetClient,
    transport: T,
}

impl ApiClient<ReqwestTransport> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(PetClient::new(&config.api_url), ReqwestTransport::default())
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(client: PetClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!("{} {}", request.method.as_str(), request.path);
        let method = request.method;
        let path = request.path.clone();
        match self.transport.execute(request).await {
            Ok(response) => {
                if !response.is_success() {
                    warn!("{} {} returned {}", method.as_str(), path, response.status);
                }
                Ok(response)
            }
            Err(e) => {
                warn!("{} {} failed: {e}", method.as_str(), path);
                Err(e)
            }
        }
    }

    pub async fn list_pets(&self) -> Result<Vec<Pet>, ApiError> {
        let response = self.send(self.client.build_list_pets()).await?;
        self.client.parse_list_pets(response)
    }

    pub async fn get_pet(&self, id: i64) -> Result<Pet, ApiError> {
        let response = self.send(self.client.build_get_pet(id)).await?;
        self.client.parse_get_pet(response)
    }

    pub async fn create_pet(&self, pet: &NewPet) -> Result<Pet, ApiError> {
        let response = self.send(self.client.build_create_pet(pet)?).await?;
        self.client.parse_create_pet(response)
    }

    /// Full replace: name, species and notes are all overwritten.
    pub async fn update_pet(&self, id: i64, pet: &NewPet) -> Result<Pet, ApiError> {
        let response = self.send(self.client.build_update_pet(id, pet)?).await?;
        self.client.parse_update_pet(response)
    }

    /// The server removes the pet's tasks along with it.
    pub async fn delete_pet(&self, id: i64) -> Result<bool, ApiError> {
        let response = self.send(self.client.build_delete_pet(id)).await?;
        self.client.parse_delete_pet(response)
    }

    pub async fn list_tasks(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Task>, ApiError> {
        let response = self.send(self.client.build_list_tasks(from, to)).await?;
        self.client.parse_list_tasks(response)
    }

    pub async fn get_task(&self, id: i64) -> Result<Task, ApiError> {
        let response = self.send(self.client.build_get_task(id)).await?;
        self.client.parse_get_task(response)
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        let response = self.send(self.client.build_create_task(task)?).await?;
        self.client.parse_create_task(response)
    }

    pub async fn update_task_status(&self, id: i64, status: TaskStatus) -> Result<Task, ApiError> {
        let request = self.client.build_update_task_status(id, status)?;
        let response = self.send(request).await?;
        self.client.parse_update_task_status(response)
    }
}
