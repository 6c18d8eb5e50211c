//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, keeping this layer
//! deterministic and free of I/O. Failures are classified here and never
//! retried or recovered.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    CreateTodo, HealthStatus, ListEnvelope, Todo, TodoFilter, TodoId, TodoPage, UpdateTodo,
};

const API_PREFIX: &str = "/api/v1";

/// RFC 3986 unreserved characters stay literal; everything else is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Which health endpoint to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthProbe {
    #[default]
    Health,
    Readiness,
    Liveness,
}

impl HealthProbe {
    fn path(self) -> &'static str {
        match self {
            HealthProbe::Health => "/health",
            HealthProbe::Readiness => "/health/readiness",
            HealthProbe::Liveness => "/health/liveness",
        }
    }
}

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn todos_url(&self) -> String {
        format!("{}{API_PREFIX}/todos", self.base_url)
    }

    fn todo_url(&self, id: &TodoId) -> String {
        format!(
            "{}/{}",
            self.todos_url(),
            utf8_percent_encode(id.as_str(), COMPONENT)
        )
    }

    pub fn build_list_todos(&self, filter: &TodoFilter) -> HttpRequest {
        let query = filter
            .query_pairs()
            .into_iter()
            .map(|(key, value)| format!("{key}={}", utf8_percent_encode(&value, COMPONENT)))
            .collect::<Vec<_>>()
            .join("&");
        HttpRequest::without_body(HttpMethod::Get, format!("{}?{query}", self.todos_url()))
    }

    pub fn build_get_todo(&self, id: &TodoId) -> HttpRequest {
        HttpRequest::without_body(HttpMethod::Get, self.todo_url(id))
    }

    /// Trims the title and description. A title that is empty after trimming
    /// is rejected before any request exists; a blank description is omitted.
    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ApiError::validation("Title is required"));
        }
        let payload = CreateTodo {
            title: title.to_string(),
            description: input
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        };
        let body = serde_json::to_string(&payload)
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest::json(HttpMethod::Post, self.todos_url(), body))
    }

    pub fn build_update_todo(&self, id: &TodoId, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest::json(HttpMethod::Put, self.todo_url(id), body))
    }

    pub fn build_delete_todo(&self, id: &TodoId) -> HttpRequest {
        HttpRequest::without_body(HttpMethod::Delete, self.todo_url(id))
    }

    pub fn build_health(&self, probe: HealthProbe) -> HttpRequest {
        HttpRequest::without_body(
            HttpMethod::Get,
            format!("{}{API_PREFIX}{}", self.base_url, probe.path()),
        )
    }

    /// Accepts both the `{ data, pagination }` and legacy `{ todos, pagination }`
    /// shapes and returns the canonical `TodoPage`.
    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<TodoPage, ApiError> {
        check_status(&response, &[200])?;
        let envelope: ListEnvelope = decode(&response.body)?;
        Ok(envelope.into())
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, &[200])?;
        decode(&response.body)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, &[201, 200])?;
        decode(&response.body)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, &[200])?;
        decode(&response.body)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[204, 200])
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<HealthStatus, ApiError> {
        check_status(&response, &[200])?;
        decode(&response.body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map any status outside `expected` to the matching `ApiError` variant.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    Err(ApiError::from_status(response.status, &response.body))
}
