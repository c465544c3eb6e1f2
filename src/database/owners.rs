use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::OwnerRow;
use crate::database::repository::OwnerRepository;
use crate::entities::Owner;

const OWNER_COLUMNS: &str = "id, phone_number, full_name, username, password_hash, created_at";

pub struct PgOwnerRepository {
    pool: PgPool,
}

impl PgOwnerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnerRepository for PgOwnerRepository {
    async fn create(&self, owner: &Owner) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO owners (id, phone_number, full_name, username, password_hash, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(owner.id)
        .bind(&owner.phone_number)
        .bind(&owner.full_name)
        .bind(&owner.username)
        .bind(&owner.password_hash)
        .bind(owner.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Owner>, DatabaseError> {
        let row = sqlx::query_as::<_, OwnerRow>(&format!("SELECT {} FROM owners WHERE id = $1", OWNER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Owner::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Owner>, DatabaseError> {
        let row = sqlx::query_as::<_, OwnerRow>(&format!("SELECT {} FROM owners WHERE username = $1", OWNER_COLUMNS))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Owner::from))
    }
}
