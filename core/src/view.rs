//! Read-only list view derived from the store on every render.

use crate::pagination::{item_range, PageControls};
use crate::store::{SyncStatus, SyncStore};
use crate::types::{Todo, TodoFilter};

#[derive(Debug, Clone, PartialEq)]
pub struct Row<'a> {
    pub todo: &'a Todo,
    pub deleting: bool,
    pub updating: bool,
    pub error: Option<String>,
}

impl Row<'_> {
    pub fn busy(&self) -> bool {
        self.deleting || self.updating
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListView<'a> {
    pub rows: Vec<Row<'a>>,
    pub loading: bool,
    pub error: Option<String>,
    pub empty_message: Option<String>,
    pub summary: Option<String>,
    pub page_label: Option<String>,
    pub controls: Option<PageControls>,
}

impl<'a> ListView<'a> {
    pub fn derive(store: &'a SyncStore) -> Self {
        let loading = store.is_loading();
        let error = store.list_error().map(|e| e.user_message());
        let page = store.page();

        let rows: Vec<Row<'a>> = page
            .map(|p| {
                p.items
                    .iter()
                    .map(|todo| Row {
                        todo,
                        deleting: store.is_deleting(&todo.id),
                        updating: store.is_updating(&todo.id),
                        error: store.item_error(&todo.id).map(|e| e.user_message()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let empty_message = (store.status() == SyncStatus::Ready && rows.is_empty())
            .then(|| empty_message(store.filter()));

        let summary = page
            .and_then(|p| item_range(&p.pagination).map(|r| (r, p.pagination.total)))
            .map(|((first, last), total)| format!("Showing {first} to {last} of {total} todos"));

        let page_label = page
            .filter(|p| p.pagination.total_pages > 1)
            .map(|p| format!("Page {} of {}", p.pagination.page, p.pagination.total_pages));

        let controls = page.and_then(|p| PageControls::derive(&p.pagination, loading));

        Self {
            rows,
            loading,
            error,
            empty_message,
            summary,
            page_label,
            controls,
        }
    }
}

/// What to say when the current filter matches nothing.
pub fn empty_message(filter: &TodoFilter) -> String {
    if let Some(search) = filter.search.as_deref() {
        return format!("No todos match \"{search}\"");
    }
    match filter.completed {
        Some(true) => "No completed todos".to_string(),
        Some(false) => "No pending todos".to_string(),
        None => "Get started by creating your first todo!".to_string(),
    }
}
