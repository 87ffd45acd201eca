//! SQLite todo store (single-process deployments).
//!
//! All writes go through one in-process mutex so that multi-statement
//! operations never interleave. Sharing the database file between several
//! processes is not supported.

use async_trait::async_trait;
use chrono::Utc;
use entities::{validate_text, Item, ItemId, ItemUpdate};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use tokio::sync::Mutex;

use crate::{row::ItemRow, Backend, SqliteConfig, TodoStore, TodoStoreError, TodoStoreResult};

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
)
"#;

const SELECT_ITEM_SQL: &str = "SELECT id, text, completed, created_at FROM items WHERE id = ?";

/// SQLite-backed todo store.
pub struct SqliteTodoStore {
    config: SqliteConfig,
    pool: Pool<Sqlite>,
    write_lock: Mutex<()>,
}

impl SqliteTodoStore {
    /// Creates a new SQLite store. No file is touched until [`TodoStore::init`].
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: SqliteConfig) -> Self {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_lazy_with(config.connect_options());

        Self {
            config,
            pool,
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn init(&self) -> TodoStoreResult<()> {
        if let Some(parent) = self.config.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    TodoStoreError::StorageSetup(format!(
                        "Failed to create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;

        tracing::info!(path = %self.config.path.display(), "SQLite todo store initialized");
        Ok(())
    }

    async fn add_item(&self, text: &str) -> TodoStoreResult<Item> {
        let text = validate_text(text)?;

        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query("INSERT INTO items (text, completed, created_at) VALUES (?, 0, ?)")
            .bind(&text)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        let row: ItemRow = sqlx::query_as(SELECT_ITEM_SQL)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(backend = "sqlite", item_id = id, "Item created");
        Ok(row.into())
    }

    async fn get_items(&self) -> TodoStoreResult<Vec<Item>> {
        let rows: Vec<ItemRow> =
            sqlx::query_as("SELECT id, text, completed, created_at FROM items ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn get_item(&self, id: ItemId) -> TodoStoreResult<Item> {
        let row: Option<ItemRow> = sqlx::query_as(SELECT_ITEM_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Item::from).ok_or(TodoStoreError::not_found(id))
    }

    async fn update_item(&self, id: ItemId, update: ItemUpdate) -> TodoStoreResult<Item> {
        let update = update.validated()?;

        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let result =
            sqlx::query("UPDATE items SET completed = ?, text = COALESCE(?, text) WHERE id = ?")
                .bind(update.completed)
                .bind(update.text.as_deref())
                .bind(id)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(TodoStoreError::not_found(id));
        }

        let row: ItemRow = sqlx::query_as(SELECT_ITEM_SQL)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            backend = "sqlite",
            item_id = id,
            completed = update.completed,
            "Item updated"
        );
        Ok(row.into())
    }

    async fn delete_item(&self, id: ItemId) -> TodoStoreResult<Item> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let row: ItemRow = sqlx::query_as(SELECT_ITEM_SQL)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(TodoStoreError::not_found(id))?;

        sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(backend = "sqlite", item_id = id, "Item deleted");
        Ok(row.into())
    }

    async fn close(&self) {
        if !self.pool.is_closed() {
            self.pool.close().await;
            tracing::info!(path = %self.config.path.display(), "SQLite todo store closed");
        }
    }
}
