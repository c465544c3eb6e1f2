use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::CategoryRow;
use crate::database::query_builder::{QueryBuilder, UpdateBuilder};
use crate::database::repository::{constraints, CategoryChanges, CategoryQuery, CategoryRepository};
use crate::entities::Category;
use crate::filter::{Column, Filter};

const CATEGORIES: &str = "categories";
const CATEGORY_COLUMNS: [&str; 7] = [
    "id",
    "store_id",
    "parent_category_id",
    "name",
    "article",
    "icon_url",
    "created_at",
];

/// True when `$2` is `$1` or one of its ancestors. `UNION` stops on loops.
const PARENT_CHAIN_CONTAINS: &str = "\
    WITH RECURSIVE chain (id, parent_category_id) AS ( \
        SELECT id, parent_category_id FROM categories WHERE id = $1 \
        UNION \
        SELECT c.id, c.parent_category_id FROM categories c JOIN chain ON c.id = chain.parent_category_id \
    ) \
    SELECT EXISTS (SELECT 1 FROM chain WHERE id = $2)";

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn base_filter() -> Result<Filter, DatabaseError> {
        let mut filter = Filter::new(CATEGORIES)?;
        for column in CATEGORY_COLUMNS {
            filter.select(Column::new(CATEGORIES, column), None)?;
        }
        Ok(filter)
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, category: &Category) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO categories (id, store_id, parent_category_id, name, article, icon_url, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(category.id)
        .bind(category.store_id)
        .bind(category.parent_category_id)
        .bind(&category.name)
        .bind(category.article.as_deref())
        .bind(&category.icon_url)
        .bind(category.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn read_by(&self, query: &CategoryQuery) -> Result<Vec<Category>, DatabaseError> {
        let mut filter = Self::base_filter()?;

        if let Some(id) = query.id {
            filter.where_eq(Column::new(CATEGORIES, "id"), id)?;
        } else {
            if let Some(text) = query.text.as_deref() {
                filter.where_ilike(Column::new(CATEGORIES, "name"), text)?;
            }
            if let Some(store_id) = query.store_id {
                filter.where_eq(Column::new(CATEGORIES, "store_id"), store_id)?;
            }
            if let Some(parent) = query.parent_category_id {
                filter.where_eq(Column::new(CATEGORIES, "parent_category_id"), parent)?;
            }
            filter.order(&query.sort)?.paginate(&query.pagination);
        }

        let rows = QueryBuilder::<CategoryRow>::new(filter).select_all(&self.pool).await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn list_by_store(&self, store_id: Uuid) -> Result<Vec<Category>, DatabaseError> {
        let mut filter = Self::base_filter()?;
        filter.where_eq(Column::new(CATEGORIES, "store_id"), store_id)?;
        let rows = QueryBuilder::<CategoryRow>::new(filter).select_all(&self.pool).await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn update(&self, id: Uuid, changes: &CategoryChanges) -> Result<Option<Category>, DatabaseError> {
        let mut update = UpdateBuilder::new(CATEGORIES)?;
        if let Some(name) = &changes.name {
            update.set("name", name.as_str())?;
        }
        if let Some(article) = &changes.article {
            update.set("article", article.clone())?;
        }
        if let Some(parent) = changes.parent_category_id {
            update.set("parent_category_id", parent)?;
        }
        update.where_eq("id", id)?.returning(&CATEGORY_COLUMNS)?;

        let mut tx = self.pool.begin().await?;

        if let Some(Some(parent)) = changes.parent_category_id {
            // store row lock: one re-parent per store at a time
            let store = sqlx::query(
                "SELECT s.id FROM stores s JOIN categories c ON c.store_id = s.id WHERE c.id = $1 FOR UPDATE OF s",
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
            if store.is_none() {
                return Ok(None);
            }

            let (cycle,): (bool,) = sqlx::query_as(PARENT_CHAIN_CONTAINS)
                .bind(parent)
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
            if cycle {
                return Err(DatabaseError::CheckViolation(constraints::CATEGORIES_PARENT_CYCLE.to_string()));
            }
        }

        let row = update.fetch_optional::<CategoryRow, _>(&mut *tx).await?;
        tx.commit().await?;
        Ok(row.map(Category::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
