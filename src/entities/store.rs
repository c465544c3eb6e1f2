use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Owner fields joined onto store reads.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: Uuid,
    #[serde(rename = "ownerID")]
    pub owner_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerSummary>,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub fn new(owner_id: Uuid, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            owner: None,
            name: name.into(),
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}
