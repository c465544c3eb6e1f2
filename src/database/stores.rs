use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::StoreRow;
use crate::database::query_builder::{QueryBuilder, UpdateBuilder};
use crate::database::repository::{StoreChanges, StoreQuery, StoreRepository};
use crate::entities::Store;
use crate::filter::{Column, Filter};

const STORES: &str = "stores";

pub struct PgStoreRepository {
    pool: PgPool,
}

impl PgStoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stores joined with the owning account's public fields.
    fn base_filter() -> Result<Filter, DatabaseError> {
        let mut filter = Filter::new(STORES)?;
        filter
            .select(Column::new(STORES, "id"), None)?
            .select(Column::new(STORES, "owner_id"), None)?
            .select(Column::new(STORES, "name"), None)?
            .select(Column::new(STORES, "description"), None)?
            .select(Column::new(STORES, "created_at"), None)?
            .select(Column::new("owners", "full_name"), Some("owner_full_name"))?
            .select(Column::new("owners", "username"), Some("owner_username"))?
            .left_join(Column::new("owners", "id"), Column::new(STORES, "owner_id"))?;
        Ok(filter)
    }
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
    async fn create(&self, store: &Store) -> Result<(), DatabaseError> {
        // tsv is a generated column, maintained by PostgreSQL
        sqlx::query(
            "INSERT INTO stores (id, owner_id, name, description, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(store.id)
        .bind(store.owner_id)
        .bind(&store.name)
        .bind(&store.description)
        .bind(store.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn read_by(&self, query: &StoreQuery) -> Result<Vec<Store>, DatabaseError> {
        let mut filter = Self::base_filter()?;

        match query.id {
            Some(id) => {
                filter.where_eq(Column::new(STORES, "id"), id)?;
            }
            None => {
                if let Some(owner_id) = query.owner_id {
                    filter.where_eq(Column::new(STORES, "owner_id"), owner_id)?;
                }
                if let Some(text) = query.text.as_deref() {
                    filter.where_text_search(Column::new(STORES, "tsv"), text)?;
                }
            }
        }
        filter.order(&query.sort)?.paginate(&query.pagination);

        let rows = QueryBuilder::<StoreRow>::new(filter).select_all(&self.pool).await?;
        Ok(rows.into_iter().map(Store::from).collect())
    }

    async fn update(&self, owner_id: Uuid, id: Uuid, changes: &StoreChanges) -> Result<Option<Store>, DatabaseError> {
        let mut update = UpdateBuilder::new(STORES)?;
        if let Some(name) = &changes.name {
            update.set("name", name.as_str())?;
        }
        if let Some(description) = &changes.description {
            update.set("description", description.as_str())?;
        }
        update
            .where_eq("id", id)?
            .where_eq("owner_id", owner_id)?
            .returning(&["id"])?;

        #[derive(sqlx::FromRow)]
        struct Updated {
            id: Uuid,
        }

        match update.fetch_optional::<Updated, _>(&self.pool).await? {
            Some(updated) => Ok(self.read_by(&StoreQuery::by_id(updated.id)).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
