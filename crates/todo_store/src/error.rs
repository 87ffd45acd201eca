//! Todo store error types.

use entities::{ItemId, ValidationError};
use thiserror::Error;

/// Errors that can occur during todo store operations.
#[derive(Debug, Error)]
pub enum TodoStoreError {
    /// Caller input failed validation.
    #[error("Invalid item: {0}")]
    Validation(#[from] ValidationError),

    /// No item has the requested id.
    #[error("Item not found: {id}")]
    NotFound { id: ItemId },

    /// The backing store could not be reached or rejected the operation.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),

    /// The backing store could not be prepared for a non-database reason.
    #[error("Storage unavailable: {0}")]
    StorageSetup(String),
}

impl TodoStoreError {
    /// Creates a not found error.
    pub fn not_found(id: ItemId) -> Self {
        Self::NotFound { id }
    }

    /// Returns true if the referenced item does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if the caller supplied invalid input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if the backing store is unreachable or misconfigured.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_) | Self::StorageSetup(_))
    }
}

/// Result type for todo store operations.
pub type TodoStoreResult<T> = Result<T, TodoStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert!(TodoStoreError::not_found(3).is_not_found());
        assert!(TodoStoreError::from(ValidationError::EmptyText).is_validation());
        assert!(TodoStoreError::from(sqlx::Error::PoolTimedOut).is_unavailable());
        assert!(TodoStoreError::StorageSetup("no disk".into()).is_unavailable());
        assert!(!TodoStoreError::not_found(3).is_unavailable());
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(TodoStoreError::not_found(42).to_string(), "Item not found: 42");
    }
}
