//! PostgreSQL todo store (multi-instance deployments).
//!
//! Every operation is a single statement; concurrent writers are serialized
//! by the database itself.

use async_trait::async_trait;
use entities::{validate_text, Item, ItemId, ItemUpdate};
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use crate::{row::ItemRow, Backend, PostgresConfig, TodoStore, TodoStoreError, TodoStoreResult};

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
    text TEXT NOT NULL,
    completed BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

/// PostgreSQL-backed todo store.
pub struct PostgresTodoStore {
    pool: Pool<Postgres>,
}

impl PostgresTodoStore {
    /// Creates a new PostgreSQL store. No connection is made until
    /// [`TodoStore::init`].
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: &PostgresConfig) -> TodoStoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy_with(config.connect_options()?);

        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for PostgresTodoStore {
    fn backend(&self) -> Backend {
        Backend::Postgres
    }

    async fn init(&self) -> TodoStoreResult<()> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;

        tracing::info!("PostgreSQL todo store initialized");
        Ok(())
    }

    async fn add_item(&self, text: &str) -> TodoStoreResult<Item> {
        let text = validate_text(text)?;

        let row: ItemRow = sqlx::query_as(
            r#"
            INSERT INTO items (text, completed)
            VALUES ($1, FALSE)
            RETURNING id, text, completed, created_at
            "#,
        )
        .bind(&text)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(backend = "postgres", item_id = row.id, "Item created");
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
        let row: Option<ItemRow> =
            sqlx::query_as("SELECT id, text, completed, created_at FROM items WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Item::from).ok_or(TodoStoreError::not_found(id))
    }

    async fn update_item(&self, id: ItemId, update: ItemUpdate) -> TodoStoreResult<Item> {
        let update = update.validated()?;

        let row: Option<ItemRow> = sqlx::query_as(
            r#"
            UPDATE items
            SET completed = $1, text = COALESCE($2, text)
            WHERE id = $3
            RETURNING id, text, completed, created_at
            "#,
        )
        .bind(update.completed)
        .bind(update.text.as_deref())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or(TodoStoreError::not_found(id))?;

        tracing::debug!(
            backend = "postgres",
            item_id = id,
            completed = update.completed,
            "Item updated"
        );
        Ok(row.into())
    }

    async fn delete_item(&self, id: ItemId) -> TodoStoreResult<Item> {
        let row: Option<ItemRow> = sqlx::query_as(
            r#"
            DELETE FROM items
            WHERE id = $1
            RETURNING id, text, completed, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or(TodoStoreError::not_found(id))?;

        tracing::debug!(backend = "postgres", item_id = id, "Item deleted");
        Ok(row.into())
    }

    async fn close(&self) {
        if !self.pool.is_closed() {
            self.pool.close().await;
            tracing::info!("PostgreSQL todo store closed");
        }
    }
}
