use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::entities::{OwnerSummary, Store};

/// Store joined with its owner. Owner columns are absent on plain selects.
#[derive(Debug, Clone, FromRow)]
pub struct StoreRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    pub owner_full_name: Option<String>,
    #[sqlx(default)]
    pub owner_username: Option<String>,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        let owner = match (row.owner_full_name, row.owner_username) {
            (Some(full_name), Some(username)) => Some(OwnerSummary {
                id: row.owner_id,
                full_name,
                username,
            }),
            _ => None,
        };
        Store {
            id: row.id,
            owner_id: row.owner_id,
            owner,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}
