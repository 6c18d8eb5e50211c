//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the service's JSON schema (camelCase keys, RFC 3339
//! timestamps) but are defined independently of the mock server. Integration
//! tests catch any schema drift between the two crates.
//!
//! The list endpoint has been observed in two shapes, `{ data, pagination }`
//! and the older `{ todos, pagination }`. Only `TodoPage` leaves this crate;
//! the wire shapes are private and converted at the parse boundary.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TITLE_MAX_LEN: usize = 200;
pub const DESCRIPTION_MAX_LEN: usize = 1000;

/// Server-assigned todo identifier. Treated as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// True once the todo has been modified after creation.
    pub fn was_edited(&self) -> bool {
        self.updated_at > self.created_at
    }
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodo {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

/// Pagination metadata attached to every list response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_next: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_previous: Option<bool>,
}

impl Pagination {
    /// Build metadata for `total` items, deriving `total_pages` as `ceil(total / limit)`.
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
        };
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: Some(page < total_pages),
            has_previous: Some(page > 1),
        }
    }
}

/// One fetched batch of todos, in server order, plus its pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoPage {
    pub items: Vec<Todo>,
    pub pagination: Pagination,
}

impl TodoPage {
    pub fn find(&self, id: &TodoId) -> Option<&Todo> {
        self.items.iter().find(|todo| &todo.id == id)
    }
}

/// Wire shapes of the list response. `Legacy` is adapted into `TodoPage` and
/// never escapes the parser.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum ListEnvelope {
    Current { data: Vec<Todo>, pagination: Pagination },
    Legacy { todos: Vec<Todo>, pagination: Pagination },
}

impl From<ListEnvelope> for TodoPage {
    fn from(envelope: ListEnvelope) -> Self {
        match envelope {
            ListEnvelope::Current { data, pagination } => TodoPage {
                items: data,
                pagination,
            },
            ListEnvelope::Legacy { todos, pagination } => TodoPage {
                items: todos,
                pagination,
            },
        }
    }
}

/// Page sizes offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageLimit {
    Five,
    #[default]
    Ten,
    TwentyFive,
    Fifty,
}

impl PageLimit {
    pub const ALL: [PageLimit; 4] = [
        PageLimit::Five,
        PageLimit::Ten,
        PageLimit::TwentyFive,
        PageLimit::Fifty,
    ];

    pub fn get(self) -> u32 {
        match self {
            PageLimit::Five => 5,
            PageLimit::Ten => 10,
            PageLimit::TwentyFive => 25,
            PageLimit::Fifty => 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("page size {0} is not one of 5, 10, 25, 50")]
pub struct PageLimitError(pub u32);

impl TryFrom<u32> for PageLimit {
    type Error = PageLimitError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        PageLimit::ALL
            .into_iter()
            .find(|limit| limit.get() == value)
            .ok_or(PageLimitError(value))
    }
}

impl fmt::Display for PageLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// The combination of status, search text and pagination that selects which
/// todos are fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoFilter {
    pub completed: Option<bool>,
    pub search: Option<String>,
    pub page: u32,
    pub limit: PageLimit,
}

impl Default for TodoFilter {
    fn default() -> Self {
        Self {
            completed: None,
            search: None,
            page: 1,
            limit: PageLimit::default(),
        }
    }
}

impl TodoFilter {
    /// Query parameters in wire order. Page and limit are always present;
    /// `completed` and `search` only when set.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.max(1).to_string()),
            ("limit", self.limit.get().to_string()),
        ];
        if let Some(completed) = self.completed {
            pairs.push(("completed", completed.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

/// Body returned by the health, readiness and liveness probes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// Error envelope used by the service for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
