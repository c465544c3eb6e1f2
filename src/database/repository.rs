use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::memory::MemoryStorage;
use crate::database::{categories, owners, stores};
use crate::entities::{Category, Owner, Store};
use crate::filter::{Column, Pagination, Sort, SortField};

/// Constraint names shared by the migration and the in-memory store.
/// `CATEGORIES_PARENT_CYCLE` has no table constraint; both repositories
/// enforce it inside the update.
pub mod constraints {
    pub const OWNERS_USERNAME: &str = "owners_username_key";
    pub const STORES_OWNER: &str = "stores_owner_id_fkey";
    pub const CATEGORIES_STORE: &str = "categories_store_id_fkey";
    pub const CATEGORIES_PARENT: &str = "categories_parent_same_store_fkey";
    pub const CATEGORIES_ARTICLE: &str = "categories_article_key";
    pub const CATEGORIES_PARENT_CYCLE: &str = "categories_parent_cycle";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSortField {
    Name,
    CreatedAt,
}

impl SortField for StoreSortField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(StoreSortField::Name),
            "createdAt" => Some(StoreSortField::CreatedAt),
            _ => None,
        }
    }

    fn column(&self) -> Column {
        match self {
            StoreSortField::Name => Column::new("stores", "name"),
            StoreSortField::CreatedAt => Column::new("stores", "created_at"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySortField {
    Name,
    Article,
    CreatedAt,
}

impl SortField for CategorySortField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(CategorySortField::Name),
            "article" => Some(CategorySortField::Article),
            "createdAt" => Some(CategorySortField::CreatedAt),
            _ => None,
        }
    }

    fn column(&self) -> Column {
        match self {
            CategorySortField::Name => Column::new("categories", "name"),
            CategorySortField::Article => Column::new("categories", "article"),
            CategorySortField::CreatedAt => Column::new("categories", "created_at"),
        }
    }
}

/// Validated store lookup. `id` wins over every other filter.
#[derive(Debug, Clone)]
pub struct StoreQuery {
    pub id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub text: Option<String>,
    pub pagination: Pagination,
    pub sort: Sort<StoreSortField>,
}

impl StoreQuery {
    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            owner_id: None,
            text: None,
            pagination: Pagination::default(),
            sort: Sort::new(StoreSortField::CreatedAt, Default::default()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StoreChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl StoreChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Validated category lookup. When `id` is set, filters, sort and
/// pagination are all ignored.
#[derive(Debug, Clone)]
pub struct CategoryQuery {
    pub id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub parent_category_id: Option<Uuid>,
    pub text: Option<String>,
    pub pagination: Pagination,
    pub sort: Sort<CategorySortField>,
}

impl CategoryQuery {
    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            store_id: None,
            parent_category_id: None,
            text: None,
            pagination: Pagination::default(),
            sort: Sort::new(CategorySortField::CreatedAt, Default::default()),
        }
    }
}

/// `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub article: Option<Option<String>>,
    pub parent_category_id: Option<Option<Uuid>>,
}

impl CategoryChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.article.is_none() && self.parent_category_id.is_none()
    }
}

#[async_trait]
pub trait OwnerRepository: Send + Sync {
    async fn create(&self, owner: &Owner) -> Result<(), DatabaseError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Owner>, DatabaseError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Owner>, DatabaseError>;
}

#[async_trait]
pub trait StoreRepository: Send + Sync {
    async fn create(&self, store: &Store) -> Result<(), DatabaseError>;
    async fn read_by(&self, query: &StoreQuery) -> Result<Vec<Store>, DatabaseError>;
    /// Only touches the row when it belongs to `owner_id`.
    async fn update(&self, owner_id: Uuid, id: Uuid, changes: &StoreChanges) -> Result<Option<Store>, DatabaseError>;
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: &Category) -> Result<(), DatabaseError>;
    async fn read_by(&self, query: &CategoryQuery) -> Result<Vec<Category>, DatabaseError>;
    async fn list_by_store(&self, store_id: Uuid) -> Result<Vec<Category>, DatabaseError>;
    /// Rejects a new parent that is the category itself or one of its
    /// descendants with `CheckViolation(CATEGORIES_PARENT_CYCLE)`. The check
    /// and the write are atomic.
    async fn update(&self, id: Uuid, changes: &CategoryChanges) -> Result<Option<Category>, DatabaseError>;
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;
    async fn close(&self);
}

#[async_trait]
impl Storage for DatabaseManager {
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.health_check().await
    }

    async fn close(&self) {
        DatabaseManager::close(self).await
    }
}

/// Every repository the services need, behind trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub owners: Arc<dyn OwnerRepository>,
    pub stores: Arc<dyn StoreRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub storage: Arc<dyn Storage>,
}

impl Repositories {
    pub fn postgres(manager: DatabaseManager) -> Self {
        let pool = manager.pool().clone();
        Self {
            owners: Arc::new(owners::PgOwnerRepository::new(pool.clone())),
            stores: Arc::new(stores::PgStoreRepository::new(pool.clone())),
            categories: Arc::new(categories::PgCategoryRepository::new(pool)),
            storage: Arc::new(manager),
        }
    }

    pub fn in_memory() -> Self {
        let memory = Arc::new(MemoryStorage::new());
        Self {
            owners: memory.clone(),
            stores: memory.clone(),
            categories: memory.clone(),
            storage: memory,
        }
    }
}
