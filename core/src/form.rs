//! Client-side checks run before a create or edit leaves the machine.

use thiserror::Error;

use crate::types::{CreateTodo, UpdateTodo, DESCRIPTION_MAX_LEN, TITLE_MAX_LEN};

pub const TITLE_MIN_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
}

/// An inline error attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FormError {
    pub field: Field,
    pub message: String,
}

impl FormError {
    fn title(message: &str) -> Self {
        Self {
            field: Field::Title,
            message: message.to_string(),
        }
    }
}

/// Raw text as typed into the create form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTodoForm {
    pub title: String,
    pub description: String,
}

impl NewTodoForm {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Trim and check the fields, producing the request payload.
    pub fn validate(&self) -> Result<CreateTodo, FormError> {
        let title = check_title(&self.title)?;
        let description = check_description(&self.description)?;
        Ok(CreateTodo {
            title,
            description: (!description.is_empty()).then_some(description),
        })
    }
}

/// Apply the form rules to whichever fields an edit supplies. A blank
/// description is dropped, as on create.
pub fn validate_update(input: &UpdateTodo) -> Result<UpdateTodo, FormError> {
    Ok(UpdateTodo {
        title: input.title.as_deref().map(check_title).transpose()?,
        description: input
            .description
            .as_deref()
            .map(check_description)
            .transpose()?
            .filter(|d| !d.is_empty()),
        completed: input.completed,
    })
}

fn check_title(raw: &str) -> Result<String, FormError> {
    let title = raw.trim();
    let len = title.chars().count();
    if len == 0 {
        return Err(FormError::title("Title is required"));
    }
    if len < TITLE_MIN_LEN {
        return Err(FormError::title("Title must be at least 3 characters long"));
    }
    if len > TITLE_MAX_LEN {
        return Err(FormError::title("Title must be at most 200 characters long"));
    }
    Ok(title.to_string())
}

fn check_description(raw: &str) -> Result<String, FormError> {
    let description = raw.trim();
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(FormError {
            field: Field::Description,
            message: "Description must be at most 1000 characters long".to_string(),
        });
    }
    Ok(description.to_string())
}
