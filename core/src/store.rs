//! Client-side synchronization store for the todo list.
//!
//! # Design
//! `SyncStore` owns the canonical view of "the current page of todos under the
//! current filter" and never performs I/O. Every user intent is a method that
//! returns `Effect`s: requests for the host to execute and outcomes for the
//! toast layer. The host reports each completed request through
//! `on_response` using the `RequestToken` it was given.
//!
//! - Each list request receives a fresh, increasing token and only the newest
//!   one is remembered. A list response carrying any other token is dropped,
//!   so results apply in request-start order no matter when they arrive.
//! - A successful mutation triggers exactly one refetch of the current filter.
//!   The page is never patched locally; counts and ordering always come from
//!   the server.
//! - A failed mutation leaves the page untouched and records the error in the
//!   acting item's slot.
//! - Search text is debounced; the host advances time with `tick`.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, warn};

use crate::client::TodoClient;
use crate::config::SyncConfig;
use crate::debounce::Debounce;
use crate::error::{ApiError, ItemOperation};
use crate::form::{self, FormError, NewTodoForm};
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{PageLimit, TodoFilter, TodoId, TodoPage, UpdateTodo};

/// Correlates an issued request with its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of the list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Nothing requested yet.
    Idle,
    /// A list request is in flight.
    Loading,
    /// The page reflects the latest list response.
    Ready,
    /// The latest list request failed; any earlier page is retained.
    Error,
}

/// Which mutation an outcome refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Create,
    Update(TodoId),
    Delete(TodoId),
}

/// Result of a finished mutation, for the notification layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Succeeded { action: Action, message: String },
    Failed { action: Action, error: ApiError, message: String },
}

impl Outcome {
    pub fn message(&self) -> &str {
        match self {
            Outcome::Succeeded { message, .. } | Outcome::Failed { message, .. } => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Execute `request` and report the result with `on_response(token, ..)`.
    Request { token: RequestToken, request: HttpRequest },
    Outcome(Outcome),
}

/// Why an intent was refused before anything was sent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntentError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl IntentError {
    pub fn message(&self) -> String {
        match self {
            IntentError::Form(e) => e.message.clone(),
            IntentError::Api(e) => e.user_message(),
        }
    }
}

#[derive(Debug, Clone)]
enum Pending {
    List,
    Create,
    Update(TodoId),
    Delete(TodoId),
}

#[derive(Debug)]
pub struct SyncStore {
    client: TodoClient,
    filter: TodoFilter,
    page: Option<TodoPage>,
    status: SyncStatus,
    list_error: Option<ApiError>,
    next_token: u64,
    active_list: Option<RequestToken>,
    search: Debounce<String>,
    pending: HashMap<RequestToken, Pending>,
    in_flight: HashSet<(TodoId, ItemOperation)>,
    item_errors: HashMap<TodoId, ApiError>,
    create_error: Option<IntentError>,
    creating: usize,
}

impl SyncStore {
    pub fn new(client: TodoClient, config: SyncConfig) -> Self {
        Self {
            client,
            filter: TodoFilter::default(),
            page: None,
            status: SyncStatus::Idle,
            list_error: None,
            next_token: 0,
            active_list: None,
            search: Debounce::new(config.search_debounce),
            pending: HashMap::new(),
            in_flight: HashSet::new(),
            item_errors: HashMap::new(),
            create_error: None,
            creating: 0,
        }
    }

    pub fn filter(&self) -> &TodoFilter {
        &self.filter
    }

    pub fn page(&self) -> Option<&TodoPage> {
        self.page.as_ref()
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == SyncStatus::Loading
    }

    pub fn list_error(&self) -> Option<&ApiError> {
        self.list_error.as_ref()
    }

    pub fn item_error(&self, id: &TodoId) -> Option<&ApiError> {
        self.item_errors.get(id)
    }

    pub fn create_error(&self) -> Option<&IntentError> {
        self.create_error.as_ref()
    }

    pub fn is_creating(&self) -> bool {
        self.creating > 0
    }

    pub fn is_deleting(&self, id: &TodoId) -> bool {
        self.in_flight.contains(&(id.clone(), ItemOperation::Delete))
    }

    pub fn is_updating(&self, id: &TodoId) -> bool {
        self.in_flight.contains(&(id.clone(), ItemOperation::Update))
    }

    /// Number of requests issued and not yet answered.
    pub fn in_flight_requests(&self) -> usize {
        self.pending.len()
    }

    /// Leave `Idle` by fetching the default filter. Does nothing afterwards.
    pub fn start(&mut self) -> Vec<Effect> {
        if self.status != SyncStatus::Idle {
            return Vec::new();
        }
        self.fetch(true)
    }

    /// Re-issue the current filter, keeping the displayed page meanwhile.
    pub fn refresh(&mut self) -> Vec<Effect> {
        self.fetch(false)
    }

    /// Record a keystroke in the search box. Nothing is fetched until the
    /// text has been stable for the debounce interval and `tick` observes it.
    pub fn set_search(&mut self, text: impl Into<String>, now: Instant) {
        self.search.push(text.into(), now);
    }

    /// Advance the clock; applies a settled search.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        let Some(text) = self.search.poll(now) else {
            return Vec::new();
        };
        let trimmed = text.trim();
        let search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        if search == self.filter.search {
            return Vec::new();
        }
        let next = TodoFilter {
            search,
            page: 1,
            ..self.filter.clone()
        };
        self.apply_filter(next)
    }

    pub fn set_completed(&mut self, completed: Option<bool>) -> Vec<Effect> {
        let next = TodoFilter {
            completed,
            page: 1,
            ..self.filter.clone()
        };
        self.apply_filter(next)
    }

    pub fn set_limit(&mut self, limit: PageLimit) -> Vec<Effect> {
        let next = TodoFilter {
            limit,
            page: 1,
            ..self.filter.clone()
        };
        self.apply_filter(next)
    }

    /// Move to another page of the same query. Clamped to the known range.
    pub fn set_page(&mut self, page: u32) -> Vec<Effect> {
        let mut page = page.max(1);
        if let Some(total_pages) = self.page.as_ref().map(|p| p.pagination.total_pages) {
            if total_pages > 0 {
                page = page.min(total_pages);
            }
        }
        let next = TodoFilter {
            page,
            ..self.filter.clone()
        };
        self.apply_filter(next)
    }

    /// Swap in a whole filter at once. Drops any search still being typed.
    pub fn replace_filter(&mut self, mut filter: TodoFilter) -> Vec<Effect> {
        if let Some(dropped) = self.search.cancel() {
            debug!(search = %dropped, "pending search superseded");
        }
        filter.page = filter.page.max(1);
        filter.search = filter
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self.apply_filter(filter)
    }

    fn apply_filter(&mut self, next: TodoFilter) -> Vec<Effect> {
        if next == self.filter && self.status != SyncStatus::Idle {
            return Vec::new();
        }
        self.filter = next;
        self.fetch(true)
    }

    /// Validate and submit the create form.
    pub fn create(&mut self, form: &NewTodoForm) -> Result<Vec<Effect>, IntentError> {
        let input = match form.validate() {
            Ok(input) => input,
            Err(e) => {
                self.create_error = Some(e.clone().into());
                return Err(e.into());
            }
        };
        let request = self.client.build_create_todo(&input)?;
        self.create_error = None;
        self.creating += 1;
        Ok(vec![self.issue(Pending::Create, request)])
    }

    /// Partially update a todo. Rejected with `Conflict` while another update
    /// of the same todo is in flight.
    pub fn update(&mut self, id: &TodoId, input: &UpdateTodo) -> Result<Vec<Effect>, IntentError> {
        let input = form::validate_update(input)?;
        if input.is_empty() {
            return Ok(Vec::new());
        }
        self.claim(id, ItemOperation::Update)?;
        let request = match self.client.build_update_todo(id, &input) {
            Ok(request) => request,
            Err(e) => {
                self.in_flight.remove(&(id.clone(), ItemOperation::Update));
                return Err(e.into());
            }
        };
        self.item_errors.remove(id);
        Ok(vec![self.issue(Pending::Update(id.clone()), request)])
    }

    /// Flip the completion flag of a todo on the current page.
    pub fn toggle(&mut self, id: &TodoId) -> Result<Vec<Effect>, IntentError> {
        let completed = self
            .page
            .as_ref()
            .and_then(|page| page.find(id))
            .map(|todo| todo.completed)
            .ok_or_else(|| ApiError::not_found(format!("Todo {id} is not on the current page")))?;
        self.update(id, &UpdateTodo::completed(!completed))
    }

    /// Delete a todo. Rejected with `Conflict` while a delete of the same todo
    /// is in flight.
    pub fn delete(&mut self, id: &TodoId) -> Result<Vec<Effect>, IntentError> {
        self.claim(id, ItemOperation::Delete)?;
        self.item_errors.remove(id);
        let request = self.client.build_delete_todo(id);
        Ok(vec![self.issue(Pending::Delete(id.clone()), request)])
    }

    /// Apply the result of a request previously handed out in an `Effect`.
    pub fn on_response(
        &mut self,
        token: RequestToken,
        result: Result<HttpResponse, ApiError>,
    ) -> Vec<Effect> {
        let Some(pending) = self.pending.remove(&token) else {
            warn!(%token, "response for unknown request token");
            return Vec::new();
        };
        match pending {
            Pending::List => {
                let result = result.and_then(|r| self.client.parse_list_todos(r));
                self.finish_list(token, result)
            }
            Pending::Create => {
                let result = result.and_then(|r| self.client.parse_create_todo(r));
                self.creating = self.creating.saturating_sub(1);
                match result {
                    Ok(todo) => {
                        debug!(id = %todo.id, "todo created");
                        self.create_error = None;
                        self.succeeded(Action::Create, "Todo created successfully")
                    }
                    Err(error) => {
                        self.create_error = Some(error.clone().into());
                        self.failed(Action::Create, error, "Failed to create todo")
                    }
                }
            }
            Pending::Update(id) => {
                let result = result.and_then(|r| self.client.parse_update_todo(r));
                self.in_flight.remove(&(id.clone(), ItemOperation::Update));
                match result {
                    Ok(_) => self.succeeded(Action::Update(id), "Todo updated successfully"),
                    Err(error) => {
                        self.item_errors.insert(id.clone(), error.clone());
                        self.failed(Action::Update(id), error, "Failed to update todo")
                    }
                }
            }
            Pending::Delete(id) => {
                let result = result.and_then(|r| self.client.parse_delete_todo(r));
                self.in_flight.remove(&(id.clone(), ItemOperation::Delete));
                match result {
                    Ok(()) => self.succeeded(Action::Delete(id), "Todo deleted successfully"),
                    Err(error) => {
                        self.item_errors.insert(id.clone(), error.clone());
                        self.failed(Action::Delete(id), error, "Failed to delete todo")
                    }
                }
            }
        }
    }

    /// Apply the active list response. A page past the end (the last item of
    /// the last page was removed) is not shown; the last existing page is
    /// requested instead.
    fn finish_list(
        &mut self,
        token: RequestToken,
        result: Result<TodoPage, ApiError>,
    ) -> Vec<Effect> {
        if self.active_list != Some(token) {
            debug!(%token, active = ?self.active_list, "discarding superseded list response");
            return Vec::new();
        }
        self.active_list = None;
        match result {
            Ok(page)
                if page.pagination.total_pages > 0
                    && self.filter.page > page.pagination.total_pages =>
            {
                let last = page.pagination.total_pages;
                debug!(%token, page = self.filter.page, last, "page past the end, moving back");
                self.filter.page = last;
                self.fetch(false)
            }
            Ok(page) => {
                debug!(
                    %token,
                    items = page.items.len(),
                    total = page.pagination.total,
                    "list applied"
                );
                self.page = Some(page);
                self.list_error = None;
                self.status = SyncStatus::Ready;
                Vec::new()
            }
            Err(error) => {
                warn!(%token, %error, "list request failed");
                self.list_error = Some(error);
                self.status = SyncStatus::Error;
                Vec::new()
            }
        }
    }

    fn succeeded(&mut self, action: Action, message: &str) -> Vec<Effect> {
        let mut effects = vec![Effect::Outcome(Outcome::Succeeded {
            action,
            message: message.to_string(),
        })];
        effects.extend(self.fetch(false));
        effects
    }

    fn failed(&mut self, action: Action, error: ApiError, context: &str) -> Vec<Effect> {
        warn!(?action, %error, "mutation failed");
        let refetch = error.is_not_found() && !matches!(action, Action::Create);
        let message = format!("{context}: {}", error.user_message());
        let mut effects = vec![Effect::Outcome(Outcome::Failed {
            action,
            error,
            message,
        })];
        if refetch {
            effects.extend(self.fetch(false));
        }
        effects
    }

    fn claim(&mut self, id: &TodoId, operation: ItemOperation) -> Result<(), ApiError> {
        if !self.in_flight.insert((id.clone(), operation)) {
            debug!(%id, %operation, "rejecting duplicate in-flight operation");
            return Err(ApiError::Conflict {
                id: id.clone(),
                operation,
            });
        }
        Ok(())
    }

    fn fetch(&mut self, invalidate: bool) -> Vec<Effect> {
        if invalidate {
            self.page = None;
        }
        self.status = SyncStatus::Loading;
        self.list_error = None;
        let request = self.client.build_list_todos(&self.filter);
        let effect = self.issue(Pending::List, request);
        if let Effect::Request { token, .. } = &effect {
            self.active_list = Some(*token);
        }
        vec![effect]
    }

    fn issue(&mut self, pending: Pending, request: HttpRequest) -> Effect {
        self.next_token += 1;
        let token = RequestToken(self.next_token);
        debug!(%token, method = %request.method, url = %request.url, "issuing request");
        self.pending.insert(token, pending);
        Effect::Request { token, request }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::http::HttpMethod;
    use crate::types::{Pagination, Todo};

    fn store() -> SyncStore {
        SyncStore::new(TodoClient::new("http://api.test"), SyncConfig::default())
    }

    fn todo(id: &str, title: &str, completed: bool) -> Todo {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        Todo {
            id: TodoId::new(id),
            title: title.to_string(),
            description: None,
            completed,
            created_at: at,
            updated_at: at,
        }
    }

    fn list_ok(items: &[Todo], page: u32, limit: u32, total: u64) -> Result<HttpResponse, ApiError> {
        let body = serde_json::json!({
            "data": items,
            "pagination": Pagination::new(page, limit, total),
        });
        Ok(HttpResponse::new(200, body.to_string()))
    }

    fn requests(effects: &[Effect]) -> Vec<(RequestToken, HttpRequest)> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Request { token, request } => Some((*token, request.clone())),
                Effect::Outcome(_) => None,
            })
            .collect()
    }

    fn outcomes(effects: &[Effect]) -> Vec<Outcome> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Outcome(o) => Some(o.clone()),
                Effect::Request { .. } => None,
            })
            .collect()
    }

    fn single(effects: &[Effect]) -> (RequestToken, HttpRequest) {
        let reqs = requests(effects);
        assert_eq!(reqs.len(), 1, "expected exactly one request, got {reqs:?}");
        reqs.into_iter().next().unwrap()
    }

    /// A started store showing `items` on page 1.
    fn ready_with(items: &[Todo]) -> SyncStore {
        let mut s = store();
        let (token, _) = single(&s.start());
        s.on_response(token, list_ok(items, 1, 10, items.len() as u64));
        assert_eq!(s.status(), SyncStatus::Ready);
        s
    }

    #[test]
    fn start_fetches_default_filter_once() {
        let mut s = store();
        assert_eq!(s.status(), SyncStatus::Idle);
        let (_, req) = single(&s.start());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://api.test/api/v1/todos?page=1&limit=10");
        assert_eq!(s.status(), SyncStatus::Loading);
        assert!(s.start().is_empty());
    }

    #[test]
    fn list_response_populates_page() {
        let s = ready_with(&[todo("1", "Alpha", false), todo("2", "Beta", true)]);
        let page = s.page().unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].title, "Alpha");
        assert!(s.list_error().is_none());
    }

    #[test]
    fn debounced_search_fires_once_with_final_text() {
        let mut s = ready_with(&[]);
        let t0 = Instant::now();
        for (i, text) in ["m", "mi", "mil", "milk"].into_iter().enumerate() {
            let now = t0 + Duration::from_millis(100 * i as u64);
            s.set_search(text, now);
            assert!(s.tick(now).is_empty());
        }
        assert!(s.tick(t0 + Duration::from_millis(599)).is_empty());
        let (_, req) = single(&s.tick(t0 + Duration::from_millis(600)));
        assert!(req.url.ends_with("search=milk"), "{}", req.url);
        assert!(s.tick(t0 + Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn filter_changes_reset_to_first_page_but_page_changes_do_not() {
        let mut s = store();
        let (token, _) = single(&s.start());
        s.on_response(token, list_ok(&[], 1, 10, 100));

        let (token, req) = single(&s.set_page(4));
        assert!(req.url.contains("page=4&limit=10"));
        s.on_response(token, list_ok(&[], 4, 10, 100));

        let (_, req) = single(&s.set_completed(Some(true)));
        assert_eq!(req.url, "http://api.test/api/v1/todos?page=1&limit=10&completed=true");
        assert!(s.page().is_none(), "filter change invalidates the page");

        let (_, req) = single(&s.set_limit(PageLimit::TwentyFive));
        assert!(req.url.contains("page=1&limit=25"));
    }

    #[test]
    fn unchanged_filter_issues_nothing() {
        let mut s = ready_with(&[]);
        assert!(s.set_completed(None).is_empty());
        assert!(s.set_page(1).is_empty());
        assert!(s.set_limit(PageLimit::Ten).is_empty());
        assert!(s.replace_filter(TodoFilter::default()).is_empty());
    }

    #[test]
    fn set_page_is_clamped_to_known_range() {
        let mut s = store();
        let (token, _) = single(&s.start());
        s.on_response(token, list_ok(&[], 1, 10, 30));
        let (_, req) = single(&s.set_page(99));
        assert!(req.url.contains("page=3"));
    }

    #[test]
    fn stale_list_response_arriving_late_is_discarded() {
        let mut s = store();
        let (a, _) = single(&s.start());
        let (b, _) = single(&s.set_completed(Some(true)));

        s.on_response(b, list_ok(&[todo("b", "From B", true)], 1, 10, 1));
        s.on_response(a, list_ok(&[todo("a", "From A", false)], 1, 10, 1));

        let page = s.page().unwrap();
        assert_eq!(page.items[0].title, "From B");
        assert_eq!(s.status(), SyncStatus::Ready);
    }

    #[test]
    fn stale_list_response_arriving_early_is_discarded() {
        let mut s = store();
        let (a, _) = single(&s.start());
        let (b, _) = single(&s.set_completed(Some(false)));

        s.on_response(a, list_ok(&[todo("a", "From A", false)], 1, 10, 1));
        assert!(s.page().is_none());
        assert_eq!(s.status(), SyncStatus::Loading);

        s.on_response(b, list_ok(&[todo("b", "From B", false)], 1, 10, 1));
        assert_eq!(s.page().unwrap().items[0].title, "From B");
    }

    #[test]
    fn list_failure_keeps_previous_page_and_retry_reloads() {
        let mut s = ready_with(&[todo("1", "Keep me", false)]);
        let (token, _) = single(&s.refresh());
        s.on_response(token, Err(ApiError::Network("reset".to_string())));

        assert_eq!(s.status(), SyncStatus::Error);
        assert_eq!(s.page().unwrap().items[0].title, "Keep me");
        assert!(matches!(s.list_error(), Some(ApiError::Network(_))));

        single(&s.refresh());
        assert_eq!(s.status(), SyncStatus::Loading);
        assert!(s.list_error().is_none());
    }

    #[test]
    fn create_trims_title_and_refetches_once() {
        let mut s = ready_with(&[]);
        let effects = s.create(&NewTodoForm::new("  Buy milk  ", "")).unwrap();
        let (token, req) = single(&effects);
        assert_eq!(req.method, HttpMethod::Post);
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Buy milk");
        assert!(s.is_creating());

        let created = serde_json::to_string(&todo("9", "Buy milk", false)).unwrap();
        let effects = s.on_response(token, Ok(HttpResponse::new(201, created)));
        let (_, refetch) = single(&effects);
        assert_eq!(refetch.url, "http://api.test/api/v1/todos?page=1&limit=10");
        assert!(outcomes(&effects)[0].is_success());
        assert!(!s.is_creating());
    }

    #[test]
    fn short_title_is_rejected_without_a_request() {
        let mut s = ready_with(&[]);
        let before = s.in_flight_requests();
        let err = s.create(&NewTodoForm::new("ab", "")).unwrap_err();
        assert_eq!(err.message(), "Title must be at least 3 characters long");
        assert_eq!(s.in_flight_requests(), before);
        assert!(s.create_error().is_some());
    }

    #[test]
    fn server_rejection_of_create_lands_in_form_slot() {
        let mut s = ready_with(&[]);
        let (token, _) = single(&s.create(&NewTodoForm::new("Valid title", "")).unwrap());
        let body = r#"{"error":{"code":"VALIDATION_ERROR","message":"Title already exists"}}"#;
        let effects = s.on_response(token, Ok(HttpResponse::new(400, body)));
        assert!(requests(&effects).is_empty());
        assert_eq!(s.create_error().unwrap().message(), "Title already exists");
        assert!(!outcomes(&effects)[0].is_success());
    }

    #[test]
    fn toggle_sends_completed_and_refetches_under_current_filter() {
        let mut s = ready_with(&[todo("1", "Walk dog", false)]);
        let id = TodoId::new("1");
        let (token, req) = single(&s.toggle(&id).unwrap());
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://api.test/api/v1/todos/1");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "completed": true }));
        assert!(s.is_updating(&id));

        // The filter moves while the update is in flight.
        let (list_token, _) = single(&s.set_completed(Some(false)));
        s.on_response(list_token, list_ok(&[todo("1", "Walk dog", false)], 1, 10, 1));

        let updated = serde_json::to_string(&todo("1", "Walk dog", true)).unwrap();
        let effects = s.on_response(token, Ok(HttpResponse::new(200, updated)));
        let (_, refetch) = single(&effects);
        assert!(refetch.url.contains("completed=false"));
        assert!(!s.is_updating(&id));
    }

    #[test]
    fn toggle_unknown_id_is_not_found() {
        let mut s = ready_with(&[]);
        let err = s.toggle(&TodoId::new("ghost")).unwrap_err();
        assert!(matches!(err, IntentError::Api(ApiError::NotFound { .. })));
    }

    #[test]
    fn duplicate_in_flight_delete_is_a_local_conflict() {
        let mut s = ready_with(&[todo("1", "Walk dog", false)]);
        let id = TodoId::new("1");
        single(&s.delete(&id).unwrap());
        let before = s.in_flight_requests();

        let err = s.delete(&id).unwrap_err();
        assert!(matches!(
            err,
            IntentError::Api(ApiError::Conflict {
                operation: ItemOperation::Delete,
                ..
            })
        ));
        assert_eq!(s.in_flight_requests(), before);
        assert!(s.is_deleting(&id));

        // An update of the same item is a different kind and may proceed.
        assert!(s.update(&id, &UpdateTodo::completed(true)).is_ok());
    }

    #[test]
    fn second_delete_reports_not_found_and_counts_come_from_server() {
        let mut s = ready_with(&[todo("1", "A", false), todo("2", "B", false)]);
        let id = TodoId::new("1");

        let (token, _) = single(&s.delete(&id).unwrap());
        let (refetch, _) = single(&s.on_response(token, Ok(HttpResponse::new(204, ""))));
        s.on_response(refetch, list_ok(&[todo("2", "B", false)], 1, 10, 1));
        assert_eq!(s.page().unwrap().pagination.total, 1);

        let (token, _) = single(&s.delete(&id).unwrap());
        let missing = r#"{"error":{"code":"NOT_FOUND","message":"Todo not found"}}"#;
        let effects = s.on_response(token, Ok(HttpResponse::new(404, missing)));
        match &outcomes(&effects)[0] {
            Outcome::Failed { error, .. } => assert!(error.is_not_found()),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(s.page().unwrap().pagination.total, 1);
        let (refetch, _) = single(&effects);
        s.on_response(refetch, list_ok(&[todo("2", "B", false)], 1, 10, 1));
        assert_eq!(s.page().unwrap().pagination.total, 1);
    }

    #[test]
    fn failed_update_is_scoped_to_its_row() {
        let mut s = ready_with(&[todo("1", "A", false), todo("2", "B", false)]);
        let id = TodoId::new("1");
        let (token, _) = single(&s.update(&id, &UpdateTodo::completed(true)).unwrap());
        let effects = s.on_response(token, Ok(HttpResponse::new(500, "")));

        assert!(requests(&effects).is_empty(), "server errors do not refetch");
        assert_eq!(outcomes(&effects)[0].message(), "Failed to update todo: Internal server error");
        assert!(matches!(s.item_error(&id), Some(ApiError::Server { .. })));
        assert!(s.item_error(&TodoId::new("2")).is_none());
        assert_eq!(s.status(), SyncStatus::Ready);
        assert_eq!(s.page().unwrap().items.len(), 2);
        assert!(!s.is_updating(&id));
    }

    #[test]
    fn invalid_edit_is_rejected_before_claiming_the_row() {
        let mut s = ready_with(&[todo("1", "A title", false)]);
        let id = TodoId::new("1");
        let edit = UpdateTodo {
            title: Some("x".to_string()),
            ..UpdateTodo::default()
        };
        assert!(matches!(s.update(&id, &edit), Err(IntentError::Form(_))));
        assert!(!s.is_updating(&id));
    }

    #[test]
    fn unknown_tokens_are_ignored() {
        let mut s = ready_with(&[]);
        let effects = s.on_response(RequestToken(999), list_ok(&[], 1, 10, 0));
        assert!(effects.is_empty());
    }

    #[test]
    fn deleting_the_only_item_on_the_last_page_moves_back_one_page() {
        let first: Vec<Todo> = (1..=10)
            .map(|i| todo(&i.to_string(), &format!("Task {i}"), false))
            .collect();
        let mut s = store();
        let (token, _) = single(&s.start());
        s.on_response(token, list_ok(&first, 1, 10, 11));
        let (token, _) = single(&s.set_page(2));
        s.on_response(token, list_ok(&[todo("11", "Task 11", false)], 2, 10, 11));

        let id = TodoId::new("11");
        let (token, _) = single(&s.delete(&id).unwrap());
        let (refetch, req) = single(&s.on_response(token, Ok(HttpResponse::new(204, ""))));
        assert!(req.url.contains("page=2&limit=10"));

        let (token, req) = single(&s.on_response(refetch, list_ok(&[], 2, 10, 10)));
        assert_eq!(req.url, "http://api.test/api/v1/todos?page=1&limit=10");
        assert_eq!(s.filter().page, 1);
        assert_eq!(s.status(), SyncStatus::Loading);

        s.on_response(token, list_ok(&first, 1, 10, 10));
        let page = s.page().unwrap();
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.pagination.page, 1);
        assert_eq!(s.status(), SyncStatus::Ready);
    }

    #[test]
    fn empty_result_on_page_one_is_shown_as_is() {
        let mut s = ready_with(&[todo("1", "Only", false)]);
        let (token, _) = single(&s.delete(&TodoId::new("1")).unwrap());
        let (refetch, _) = single(&s.on_response(token, Ok(HttpResponse::new(204, ""))));
        assert!(s.on_response(refetch, list_ok(&[], 1, 10, 0)).is_empty());
        assert!(s.page().unwrap().items.is_empty());
        assert_eq!(s.status(), SyncStatus::Ready);
    }

    #[test]
    fn duplicate_in_flight_update_is_a_local_conflict() {
        let mut s = ready_with(&[todo("1", "Walk dog", false)]);
        let id = TodoId::new("1");
        single(&s.update(&id, &UpdateTodo::completed(true)).unwrap());
        let before = s.in_flight_requests();

        let err = s.update(&id, &UpdateTodo::completed(false)).unwrap_err();
        assert!(matches!(
            err,
            IntentError::Api(ApiError::Conflict {
                operation: ItemOperation::Update,
                ..
            })
        ));
        assert_eq!(s.in_flight_requests(), before);
        assert!(s.is_updating(&id));
        assert!(s.delete(&id).is_ok());
    }

    #[test]
    fn update_not_found_refetches() {
        let mut s = ready_with(&[todo("1", "Walk dog", false)]);
        let id = TodoId::new("1");
        let (token, _) = single(&s.update(&id, &UpdateTodo::completed(true)).unwrap());
        let effects = s.on_response(token, Ok(HttpResponse::new(404, "")));

        assert!(!outcomes(&effects)[0].is_success());
        let (_, refetch) = single(&effects);
        assert_eq!(refetch.url, "http://api.test/api/v1/todos?page=1&limit=10");
        assert!(s.item_error(&id).unwrap().is_not_found());
        assert!(!s.is_updating(&id));
    }

    #[test]
    fn settling_on_the_current_search_issues_nothing() {
        let mut s = ready_with(&[]);
        let t0 = Instant::now();
        s.set_search("milk", t0);
        let (token, _) = single(&s.tick(t0 + Duration::from_millis(300)));
        s.on_response(token, list_ok(&[], 1, 10, 0));

        s.set_search("milk ", t0 + Duration::from_secs(1));
        assert!(s.tick(t0 + Duration::from_secs(2)).is_empty());
        assert_eq!(s.filter().search.as_deref(), Some("milk"));
    }

    #[test]
    fn replacing_the_filter_drops_a_pending_search() {
        let mut s = ready_with(&[]);
        let t0 = Instant::now();
        s.set_search("milk", t0);
        single(&s.replace_filter(TodoFilter {
            completed: Some(true),
            ..TodoFilter::default()
        }));
        assert!(s.tick(t0 + Duration::from_secs(1)).is_empty());
        assert_eq!(s.filter().search, None);
    }
}
