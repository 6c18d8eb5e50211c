//! Transient notifications for mutation outcomes.
//!
//! Independent of the store: it only consumes `Outcome`s. Expiry is checked
//! against caller-supplied instants.

use std::time::{Duration, Instant};

use crate::store::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct ToastQueue {
    ttl: Duration,
    next_id: u64,
    toasts: Vec<Toast>,
}

impl ToastQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_id: 0,
            toasts: Vec::new(),
        }
    }

    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>, now: Instant) -> u64 {
        self.next_id += 1;
        self.toasts.push(Toast {
            id: self.next_id,
            kind,
            message: message.into(),
            expires_at: now + self.ttl,
        });
        self.next_id
    }

    pub fn observe(&mut self, outcome: &Outcome, now: Instant) -> u64 {
        let kind = if outcome.is_success() {
            ToastKind::Success
        } else {
            ToastKind::Error
        };
        self.push(kind, outcome.message(), now)
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    /// Drop expired toasts.
    pub fn tick(&mut self, now: Instant) {
        self.toasts.retain(|t| t.expires_at > now);
    }

    /// Oldest first.
    pub fn visible(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }
}
