//! Blocking host for a `SyncStore`.
//!
//! Executes each requested effect on the calling thread, feeds the response
//! back into the store, and routes outcomes into a `ToastQueue`. Requests run
//! one at a time, so list responses always arrive in start order here; the
//! store's token check still guards hosts that interleave.

use std::collections::VecDeque;
use std::time::Instant;

use tracing::debug;

use crate::client::TodoClient;
use crate::config::{ClientConfig, SyncConfig};
use crate::form::NewTodoForm;
use crate::store::{Effect, IntentError, Outcome, SyncStore};
use crate::toast::ToastQueue;
use crate::transport::Transport;
use crate::types::{TodoFilter, TodoId, UpdateTodo};

pub struct Session<T> {
    store: SyncStore,
    transport: T,
    toasts: ToastQueue,
}

impl<T: Transport> Session<T> {
    pub fn new(config: &ClientConfig, sync: SyncConfig, transport: T) -> Self {
        Self {
            store: SyncStore::new(TodoClient::new(config.base_url()), sync),
            transport,
            toasts: ToastQueue::new(sync.toast_ttl),
        }
    }

    pub fn store(&self) -> &SyncStore {
        &self.store
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut ToastQueue {
        &mut self.toasts
    }

    pub fn start(&mut self) -> Vec<Outcome> {
        let effects = self.store.start();
        self.run(effects, Instant::now())
    }

    pub fn refresh(&mut self) -> Vec<Outcome> {
        let effects = self.store.refresh();
        self.run(effects, Instant::now())
    }

    pub fn replace_filter(&mut self, filter: TodoFilter) -> Vec<Outcome> {
        let effects = self.store.replace_filter(filter);
        self.run(effects, Instant::now())
    }

    pub fn set_page(&mut self, page: u32) -> Vec<Outcome> {
        let effects = self.store.set_page(page);
        self.run(effects, Instant::now())
    }

    /// Type into the search box. Call `settle` to apply it.
    pub fn search(&mut self, text: &str, now: Instant) {
        self.store.set_search(text, now);
    }

    /// Apply a pending search if its quiet interval has passed by `now`.
    pub fn settle(&mut self, now: Instant) -> Vec<Outcome> {
        let effects = self.store.tick(now);
        self.toasts.tick(now);
        self.run(effects, now)
    }

    pub fn create(&mut self, form: &NewTodoForm) -> Result<Vec<Outcome>, IntentError> {
        let effects = self.store.create(form)?;
        Ok(self.run(effects, Instant::now()))
    }

    pub fn update(&mut self, id: &TodoId, input: &UpdateTodo) -> Result<Vec<Outcome>, IntentError> {
        let effects = self.store.update(id, input)?;
        Ok(self.run(effects, Instant::now()))
    }

    pub fn toggle(&mut self, id: &TodoId) -> Result<Vec<Outcome>, IntentError> {
        let effects = self.store.toggle(id)?;
        Ok(self.run(effects, Instant::now()))
    }

    pub fn delete(&mut self, id: &TodoId) -> Result<Vec<Outcome>, IntentError> {
        let effects = self.store.delete(id)?;
        Ok(self.run(effects, Instant::now()))
    }

    /// Drain `effects` and everything they cause.
    fn run(&mut self, effects: Vec<Effect>, now: Instant) -> Vec<Outcome> {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut outcomes = Vec::new();
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Request { token, request } => {
                    let result = self.transport.execute(&request);
                    debug!(%token, ok = result.is_ok(), "request completed");
                    queue.extend(self.store.on_response(token, result));
                }
                Effect::Outcome(outcome) => {
                    self.toasts.observe(&outcome, now);
                    outcomes.push(outcome);
                }
            }
        }
        outcomes
    }
}
