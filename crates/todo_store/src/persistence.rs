//! Persistence facade.
//!
//! Selects one driver from [`StoreConfig`] at startup and forwards every
//! operation to it. Errors are passed through untouched so callers can map
//! them the same way whichever backend is active.

use std::sync::Arc;

use entities::{Item, ItemId, ItemUpdate};

use crate::{
    Backend, PostgresTodoStore, SqliteTodoStore, StoreConfig, TodoStore, TodoStoreResult,
};

/// Process-wide handle to the active todo store.
#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn TodoStore>,
}

impl Persistence {
    /// Builds the driver selected by `config` and initializes it.
    ///
    /// An error here means the store is unusable; callers should abort
    /// startup rather than serve requests.
    pub async fn open(config: &StoreConfig) -> TodoStoreResult<Self> {
        let store: Arc<dyn TodoStore> = match config {
            StoreConfig::Sqlite(sqlite) => Arc::new(SqliteTodoStore::new(sqlite.clone())),
            StoreConfig::Postgres(postgres) => Arc::new(PostgresTodoStore::new(postgres)?),
        };

        tracing::info!(backend = %store.backend(), "Initializing todo store");

        if let Err(e) = store.init().await {
            tracing::error!(backend = %store.backend(), error = %e, "Todo store initialization failed");
            store.close().await;
            return Err(e);
        }

        Ok(Self { store })
    }

    /// Wraps a driver that has already been initialized.
    pub fn from_store(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    /// Returns the active backend.
    pub fn backend(&self) -> Backend {
        self.store.backend()
    }

    /// Creates a new item.
    pub async fn add_item(&self, text: &str) -> TodoStoreResult<Item> {
        self.store.add_item(text).await
    }

    /// Lists all items in insertion order.
    pub async fn get_items(&self) -> TodoStoreResult<Vec<Item>> {
        self.store.get_items().await
    }

    /// Gets a single item.
    pub async fn get_item(&self, id: ItemId) -> TodoStoreResult<Item> {
        self.store.get_item(id).await
    }

    /// Updates an item.
    pub async fn update_item(&self, id: ItemId, update: ItemUpdate) -> TodoStoreResult<Item> {
        self.store.update_item(id, update).await
    }

    /// Deletes an item.
    pub async fn delete_item(&self, id: ItemId) -> TodoStoreResult<Item> {
        self.store.delete_item(id).await
    }

    /// Releases the active driver's resources.
    pub async fn close(&self) {
        self.store.close().await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::{PostgresConfig, SqliteConfig};

    #[tokio::test]
    async fn test_open_sqlite() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::Sqlite(SqliteConfig::new(dir.path().join("todo.db")));

        let persistence = Persistence::open(&config).await.unwrap();
        assert_eq!(persistence.backend(), Backend::Sqlite);

        let item = persistence.add_item("Buy milk").await.unwrap();
        assert_eq!(persistence.get_item(item.id).await.unwrap(), item);

        // Clones share the same driver.
        let other = persistence.clone();
        assert_eq!(other.get_items().await.unwrap(), vec![item]);

        persistence.close().await;
    }

    #[tokio::test]
    async fn test_open_fails_fast_on_unreachable_postgres() {
        let config = StoreConfig::Postgres(PostgresConfig {
            host: Some("127.0.0.1".into()),
            port: Some(1),
            user: Some("todo".into()),
            database: Some("todos".into()),
            acquire_timeout: Duration::from_secs(2),
            ..PostgresConfig::with_defaults()
        });

        let err = Persistence::open(&config).await.err().unwrap();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::Sqlite(SqliteConfig::new(dir.path().join("todo.db")));
        let persistence = Persistence::open(&config).await.unwrap();

        assert!(persistence.add_item(" ").await.unwrap_err().is_validation());
        assert!(persistence
            .update_item(99, ItemUpdate::status(true))
            .await
            .unwrap_err()
            .is_not_found());
        assert!(persistence.delete_item(99).await.unwrap_err().is_not_found());
    }
}
