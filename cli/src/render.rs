//! Plain-text rendering of list views, single todos and notifications.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use todo_sync::pagination::NavButton;
use todo_sync::{HealthStatus, ListView, PageControls, Row, Todo, Toast, ToastKind};

const TIMESTAMP: &str = "%Y-%m-%d %H:%M";

fn stamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP).to_string()
}

pub fn list(view: &ListView<'_>) -> String {
    let mut out = String::new();
    if let Some(error) = &view.error {
        let _ = writeln!(out, "error: {error}");
    }
    if let Some(message) = &view.empty_message {
        let _ = writeln!(out, "{message}");
    }
    for row in &view.rows {
        let _ = writeln!(out, "{}", row_line(row));
        if let Some(error) = &row.error {
            let _ = writeln!(out, "      ! {error}");
        }
    }
    if let Some(summary) = &view.summary {
        let _ = writeln!(out, "{summary}");
    }
    if let (Some(label), Some(controls)) = (&view.page_label, &view.controls) {
        let _ = writeln!(out, "{label}  {}", controls_line(controls));
    }
    out
}

fn row_line(row: &Row<'_>) -> String {
    let todo = row.todo;
    let mark = if todo.completed { "[x]" } else { "[ ]" };
    let mut line = format!("{mark} {}  {}", todo.id, todo.title);
    if let Some(description) = &todo.description {
        let _ = write!(line, " - {description}");
    }
    let _ = write!(line, "  ({})", stamp(&todo.created_at));
    if todo.was_edited() {
        line.push_str(" (edited)");
    }
    if row.deleting {
        line.push_str(" deleting...");
    } else if row.updating {
        line.push_str(" saving...");
    }
    line
}

fn nav(label: &str, button: NavButton) -> String {
    if button.enabled {
        format!("{label}{}", button.target)
    } else {
        "-".to_string()
    }
}

/// One line of page controls, e.g. `<<1 <2 1 2 [3] 4 5 >4 >>9`.
/// Disabled navigation buttons render as `-`.
pub fn controls_line(controls: &PageControls) -> String {
    let mut parts = vec![nav("<<", controls.first), nav("<", controls.prev)];
    parts.extend(controls.pages.iter().map(|p| {
        if p.current {
            format!("[{}]", p.number)
        } else {
            p.number.to_string()
        }
    }));
    parts.push(nav(">", controls.next));
    parts.push(nav(">>", controls.last));
    parts.join(" ")
}

pub fn detail(todo: &Todo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "id:          {}", todo.id);
    let _ = writeln!(out, "title:       {}", todo.title);
    if let Some(description) = &todo.description {
        let _ = writeln!(out, "description: {description}");
    }
    let status = if todo.completed { "completed" } else { "pending" };
    let _ = writeln!(out, "status:      {status}");
    let _ = writeln!(out, "created:     {}", stamp(&todo.created_at));
    if todo.was_edited() {
        let _ = writeln!(out, "updated:     {}", stamp(&todo.updated_at));
    }
    out
}

pub fn health(status: &HealthStatus) -> String {
    format!("{}: {} ({})", status.status, status.message, stamp(&status.timestamp))
}

pub fn toast(toast: &Toast) -> String {
    match toast.kind {
        ToastKind::Success => format!("ok: {}", toast.message),
        ToastKind::Error => format!("error: {}", toast.message),
    }
}
