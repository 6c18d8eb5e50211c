//! Client core for the todo service: typed requests, a synchronization store,
//! and the view derivations a front-end renders.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network. `SyncStore` keeps one authoritative page of todos
//! for the current filter and says, through `Effect`s, which requests to run.
//! A host (the blocking `Session`, a GUI event loop, a test) executes them.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - Every operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and the store stays deterministic.
//! - Time enters only as `Instant` arguments; debounce and toast expiry are
//!   testable with a simulated clock.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod form;
pub mod http;
pub mod pagination;
pub mod session;
pub mod store;
pub mod toast;
pub mod transport;
pub mod types;
pub mod view;

pub use api::TodoApi;
pub use client::{HealthProbe, TodoClient};
pub use config::{ClientConfig, ConfigError, SyncConfig};
pub use error::{ApiError, ItemOperation};
pub use form::{Field, FormError, NewTodoForm};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use pagination::PageControls;
pub use session::Session;
pub use store::{Action, Effect, IntentError, Outcome, RequestToken, SyncStatus, SyncStore};
pub use toast::{Toast, ToastKind, ToastQueue};
pub use transport::{Transport, UreqTransport};
pub use types::{
    CreateTodo, HealthStatus, PageLimit, Pagination, Todo, TodoFilter, TodoId, TodoPage,
    UpdateTodo,
};
pub use view::{ListView, Row};
