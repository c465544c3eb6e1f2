use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::entities::Owner;

#[derive(Debug, Clone, FromRow)]
pub struct OwnerRow {
    pub id: Uuid,
    pub phone_number: String,
    pub full_name: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<OwnerRow> for Owner {
    fn from(row: OwnerRow) -> Self {
        Owner {
            id: row.id,
            phone_number: row.phone_number,
            full_name: row.full_name,
            username: row.username,
            password_hash: row.password_hash,
            sellers: Vec::new(),
            created_at: row.created_at,
        }
    }
}
