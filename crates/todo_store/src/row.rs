use chrono::{DateTime, Utc};
use entities::Item;
use sqlx::FromRow;

/// Database row for Item, shared by both drivers.
#[derive(Debug, FromRow)]
pub(crate) struct ItemRow {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            text: row.text,
            completed: row.completed,
            created_at: row.created_at,
        }
    }
}
