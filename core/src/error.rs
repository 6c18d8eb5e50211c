//! Error types for the todo API client and synchronization store.
//!
//! # Design
//! Every remote failure is classified once, at the parse boundary, and then
//! passed upward unchanged. `NotFound` and `Validation` get dedicated variants
//! because the store reacts to them differently (refetch vs. form error).
//! `Conflict` never comes from the network: the store raises it locally when
//! an item already has the same kind of operation in flight.

use thiserror::Error;

use crate::types::{ErrorBody, TodoId};

/// Kind of per-item operation tracked by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemOperation {
    Update,
    Delete,
}

impl std::fmt::Display for ItemOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemOperation::Update => f.write_str("update"),
            ItemOperation::Delete => f.write_str("delete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// No response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The service rejected the request with a 4xx other than 404.
    #[error("validation failed ({code}): {message}")]
    Validation {
        code: String,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// The service returned 404.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The service returned 5xx.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// The same operation is already in flight for this todo.
    #[error("a {operation} is already in progress for todo {id}")]
    Conflict { id: TodoId, operation: ItemOperation },

    /// A status outside the success, 4xx and 5xx ranges the client expects.
    #[error("unexpected HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            code: "VALIDATION_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound {
            message: message.into(),
        }
    }

    /// Classify a non-success response. The service's error envelope is used
    /// when it parses; otherwise a generic message stands in.
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorBody>(body).ok().map(|b| b.error);
        match status {
            404 => ApiError::NotFound {
                message: parsed
                    .map(|e| e.message)
                    .unwrap_or_else(|| "Todo not found".to_string()),
            },
            400..=499 => match parsed {
                Some(e) => ApiError::Validation {
                    code: e.code,
                    message: e.message,
                    details: e.details,
                },
                None => ApiError::Validation {
                    code: format!("HTTP_{status}"),
                    message: "The request was rejected".to_string(),
                    details: None,
                },
            },
            500..=599 => ApiError::Server {
                status,
                message: parsed
                    .map(|e| e.message)
                    .unwrap_or_else(|| "Internal server error".to_string()),
            },
            _ => ApiError::UnexpectedStatus {
                status,
                body: body.to_string(),
            },
        }
    }

    /// Text suitable for a toast or inline message.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ApiError::Validation { message, .. }
            | ApiError::NotFound { message }
            | ApiError::Server { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}
