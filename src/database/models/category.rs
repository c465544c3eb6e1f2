use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::entities::Category;

#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    pub id: Uuid,
    pub store_id: Uuid,
    pub parent_category_id: Option<Uuid>,
    pub name: String,
    pub article: Option<String>,
    pub icon_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            store_id: row.store_id,
            parent_category_id: row.parent_category_id,
            name: row.name,
            article: row.article,
            icon_url: row.icon_url,
            created_at: row.created_at,
        }
    }
}
