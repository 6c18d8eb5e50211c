//! One blocking call per remote action, composed from `TodoClient` and a
//! `Transport`. Single-shot: no retries, errors returned as classified.

use crate::client::{HealthProbe, TodoClient};
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{CreateTodo, HealthStatus, Todo, TodoFilter, TodoId, TodoPage, UpdateTodo};

#[derive(Debug, Clone)]
pub struct TodoApi<T> {
    client: TodoClient,
    transport: T,
}

impl<T: Transport> TodoApi<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn list(&self, filter: &TodoFilter) -> Result<TodoPage, ApiError> {
        let response = self.transport.execute(&self.client.build_list_todos(filter))?;
        self.client.parse_list_todos(response)
    }

    pub fn get(&self, id: &TodoId) -> Result<Todo, ApiError> {
        let response = self.transport.execute(&self.client.build_get_todo(id))?;
        self.client.parse_get_todo(response)
    }

    pub fn create(&self, title: &str, description: Option<&str>) -> Result<Todo, ApiError> {
        let input = CreateTodo {
            title: title.to_string(),
            description: description.map(str::to_string),
        };
        let response = self.transport.execute(&self.client.build_create_todo(&input)?)?;
        self.client.parse_create_todo(response)
    }

    pub fn update(&self, id: &TodoId, input: &UpdateTodo) -> Result<Todo, ApiError> {
        let response = self
            .transport
            .execute(&self.client.build_update_todo(id, input)?)?;
        self.client.parse_update_todo(response)
    }

    pub fn remove(&self, id: &TodoId) -> Result<(), ApiError> {
        let response = self.transport.execute(&self.client.build_delete_todo(id))?;
        self.client.parse_delete_todo(response)
    }

    pub fn health(&self, probe: HealthProbe) -> Result<HealthStatus, ApiError> {
        let response = self.transport.execute(&self.client.build_health(probe))?;
        self.client.parse_health(response)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::http::{HttpRequest, HttpResponse};

    #[test]
    fn blank_title_never_reaches_the_transport() {
        let calls = Cell::new(0);
        let transport = |_: &HttpRequest| -> Result<HttpResponse, ApiError> {
            calls.set(calls.get() + 1);
            Ok(HttpResponse::new(201, ""))
        };
        let api = TodoApi::new(TodoClient::new("http://api.test"), transport);
        assert!(matches!(api.create("  ", None), Err(ApiError::Validation { .. })));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn transport_failures_surface_unchanged() {
        let transport = |_: &HttpRequest| -> Result<HttpResponse, ApiError> {
            Err(ApiError::Network("connection refused".to_string()))
        };
        let api = TodoApi::new(TodoClient::new("http://api.test"), transport);
        assert_eq!(
            api.remove(&TodoId::new("1")).unwrap_err(),
            ApiError::Network("connection refused".to_string())
        );
    }
}
