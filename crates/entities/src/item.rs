//! Item entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier assigned to an item by the store.
pub type ItemId = i64;

/// Errors produced when caller input fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Text is empty or whitespace-only.
    #[error("Item text must not be empty")]
    EmptyText,
}

/// Validates and normalizes item text.
///
/// Returns the trimmed text, or an error when nothing is left after trimming.
pub fn validate_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyText);
    }

    Ok(trimmed.to_string())
}

/// A single todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Store-assigned identifier.
    pub id: ItemId,
    /// Normalized item text.
    #[serde(alias = "name")]
    pub text: String,
    /// Whether the item has been completed.
    pub completed: bool,
    /// When this item was created.
    pub created_at: DateTime<Utc>,
}

/// Changes applied by an update operation.
///
/// `completed` is always written. `text` is optional and, when present, is
/// validated with the same rules as creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemUpdate {
    /// New completion status.
    pub completed: bool,
    /// Replacement text, if any.
    #[serde(default, alias = "name")]
    pub text: Option<String>,
}

impl ItemUpdate {
    /// Creates an update that only changes the completion status.
    pub fn status(completed: bool) -> Self {
        Self {
            completed,
            text: None,
        }
    }

    /// Sets replacement text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Returns a copy with the replacement text normalized.
    pub fn validated(&self) -> Result<Self, ValidationError> {
        let text = self.text.as_deref().map(validate_text).transpose()?;
        Ok(Self {
            completed: self.completed,
            text,
        })
    }
}
