//! Todo store trait definitions.

use async_trait::async_trait;
use entities::{Item, ItemId, ItemUpdate};

use crate::{Backend, TodoStoreResult};

/// Trait implemented by every storage driver.
///
/// Drivers own their connection pool exclusively. `init` must be called once
/// before any item operation; `close` may be called any number of times.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Returns which backend this driver talks to.
    fn backend(&self) -> Backend;

    /// Opens the underlying store and creates the item table if absent.
    async fn init(&self) -> TodoStoreResult<()>;

    /// Creates a new, uncompleted item.
    async fn add_item(&self, text: &str) -> TodoStoreResult<Item>;

    /// Lists all items in insertion order.
    async fn get_items(&self) -> TodoStoreResult<Vec<Item>>;

    /// Gets a single item by ID.
    async fn get_item(&self, id: ItemId) -> TodoStoreResult<Item>;

    /// Updates an item's completion status and, optionally, its text.
    async fn update_item(&self, id: ItemId, update: ItemUpdate) -> TodoStoreResult<Item>;

    /// Deletes an item, returning what was removed.
    async fn delete_item(&self, id: ItemId) -> TodoStoreResult<Item>;

    /// Releases the underlying connections.
    async fn close(&self);
}
