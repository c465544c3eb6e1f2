use async_trait::async_trait;
use std::cmp::Ordering;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::repository::{
    constraints, CategoryChanges, CategoryQuery, CategoryRepository, CategorySortField, OwnerRepository,
    Storage, StoreChanges, StoreQuery, StoreRepository, StoreSortField,
};
use crate::entities::{Category, CategoryTree, Owner, OwnerSummary, Store};
use crate::filter::{Pagination, SortDirection};

#[derive(Debug, Default)]
struct Tables {
    owners: Vec<Owner>,
    stores: Vec<Store>,
    categories: Vec<Category>,
}

/// Process-local storage with the same constraint behaviour as the
/// PostgreSQL schema. Used by `--in-memory` runs and the test suites.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn owner_summary(&self, owner_id: Uuid) -> Option<OwnerSummary> {
        self.owners
            .iter()
            .find(|o| o.id == owner_id)
            .map(|o| OwnerSummary {
                id: o.id,
                full_name: o.full_name.clone(),
                username: o.username.clone(),
            })
    }

    fn with_owner(&self, store: &Store) -> Store {
        let mut store = store.clone();
        store.owner = self.owner_summary(store.owner_id);
        store
    }

    fn check_category(&self, category: &Category) -> Result<(), DatabaseError> {
        if !self.stores.iter().any(|s| s.id == category.store_id) {
            return Err(DatabaseError::ForeignKeyViolation(constraints::CATEGORIES_STORE.to_string()));
        }
        if let Some(parent) = category.parent_category_id {
            let same_store = self
                .categories
                .iter()
                .any(|c| c.id == parent && c.store_id == category.store_id);
            if !same_store {
                return Err(DatabaseError::ForeignKeyViolation(constraints::CATEGORIES_PARENT.to_string()));
            }
        }
        if let Some(article) = category.article.as_deref() {
            let taken = self
                .categories
                .iter()
                .any(|c| c.id != category.id && c.article.as_deref() == Some(article));
            if taken {
                return Err(DatabaseError::UniqueViolation(constraints::CATEGORIES_ARTICLE.to_string()));
            }
        }
        Ok(())
    }

    fn store_tree(&self, store_id: Uuid) -> CategoryTree {
        let in_store: Vec<Category> = self
            .categories
            .iter()
            .filter(|c| c.store_id == store_id)
            .cloned()
            .collect();
        CategoryTree::build(in_store)
    }

    /// Removes a category and everything below it, mirroring ON DELETE CASCADE.
    fn remove_category_tree(&mut self, id: Uuid, store_id: Uuid) {
        let mut doomed = self.store_tree(store_id).descendants(id);
        doomed.push(id);
        self.categories.retain(|c| !doomed.contains(&c.id));
    }
}

fn page<T>(items: Vec<T>, pagination: &Pagination) -> Vec<T> {
    let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(pagination.limit()).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Approximates `tsv @@ plainto_tsquery('simple', text)`: every query word
/// must appear as a whole word in the name or description.
fn text_matches(store: &Store, text: &str) -> bool {
    let haystack: Vec<String> = words(&store.name).chain(words(&store.description)).collect();
    let mut needles = words(text).peekable();
    if needles.peek().is_none() {
        return false;
    }
    needles.all(|w| haystack.contains(&w))
}

#[async_trait]
impl OwnerRepository for MemoryStorage {
    async fn create(&self, owner: &Owner) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.owners.iter().any(|o| o.username == owner.username) {
            return Err(DatabaseError::UniqueViolation(constraints::OWNERS_USERNAME.to_string()));
        }
        tables.owners.push(owner.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Owner>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.owners.iter().find(|o| o.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Owner>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.owners.iter().find(|o| o.username == username).cloned())
    }
}

#[async_trait]
impl StoreRepository for MemoryStorage {
    async fn create(&self, store: &Store) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.owners.iter().any(|o| o.id == store.owner_id) {
            return Err(DatabaseError::ForeignKeyViolation(constraints::STORES_OWNER.to_string()));
        }
        let mut store = store.clone();
        store.owner = None;
        tables.stores.push(store);
        Ok(())
    }

    async fn read_by(&self, query: &StoreQuery) -> Result<Vec<Store>, DatabaseError> {
        let tables = self.tables.read().await;

        let mut found: Vec<Store> = tables
            .stores
            .iter()
            .filter(|s| match query.id {
                Some(id) => s.id == id,
                None => {
                    query.owner_id.map_or(true, |owner| s.owner_id == owner)
                        && query.text.as_deref().map_or(true, |t| text_matches(s, t))
                }
            })
            .map(|s| tables.with_owner(s))
            .collect();

        found.sort_by(|a, b| {
            let ordering = match query.sort.field {
                StoreSortField::Name => a.name.cmp(&b.name),
                StoreSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            directed(ordering, query.sort.direction)
        });

        Ok(page(found, &query.pagination))
    }

    async fn update(&self, owner_id: Uuid, id: Uuid, changes: &StoreChanges) -> Result<Option<Store>, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(store) = tables
            .stores
            .iter_mut()
            .find(|s| s.id == id && s.owner_id == owner_id)
        else {
            return Ok(None);
        };

        if let Some(name) = &changes.name {
            store.name = name.clone();
        }
        if let Some(description) = &changes.description {
            store.description = description.clone();
        }
        let updated = store.clone();
        Ok(Some(tables.with_owner(&updated)))
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.stores.len();
        tables.stores.retain(|s| !(s.id == id && s.owner_id == owner_id));
        let deleted = tables.stores.len() != before;
        if deleted {
            tables.categories.retain(|c| c.store_id != id);
        }
        Ok(deleted)
    }
}

#[async_trait]
impl CategoryRepository for MemoryStorage {
    async fn create(&self, category: &Category) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.check_category(category)?;
        tables.categories.push(category.clone());
        Ok(())
    }

    async fn read_by(&self, query: &CategoryQuery) -> Result<Vec<Category>, DatabaseError> {
        let tables = self.tables.read().await;

        if let Some(id) = query.id {
            return Ok(tables.categories.iter().filter(|c| c.id == id).cloned().collect());
        }

        let needle = query.text.as_deref().map(str::to_lowercase);
        let mut found: Vec<Category> = tables
            .categories
            .iter()
            .filter(|c| {
                needle.as_deref().map_or(true, |t| c.name.to_lowercase().contains(t))
                    && query.store_id.map_or(true, |s| c.store_id == s)
                    && query
                        .parent_category_id
                        .map_or(true, |p| c.parent_category_id == Some(p))
            })
            .cloned()
            .collect();

        found.sort_by(|a, b| {
            let ordering = match query.sort.field {
                CategorySortField::Name => a.name.cmp(&b.name),
                CategorySortField::Article => a.article.cmp(&b.article),
                CategorySortField::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            directed(ordering, query.sort.direction)
        });

        Ok(page(found, &query.pagination))
    }

    async fn list_by_store(&self, store_id: Uuid) -> Result<Vec<Category>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .filter(|c| c.store_id == store_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, changes: &CategoryChanges) -> Result<Option<Category>, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(position) = tables.categories.iter().position(|c| c.id == id) else {
            return Ok(None);
        };

        let mut updated = tables.categories[position].clone();
        if let Some(name) = &changes.name {
            updated.name = name.clone();
        }
        if let Some(article) = &changes.article {
            updated.article = article.clone();
        }
        if let Some(parent) = changes.parent_category_id {
            updated.parent_category_id = parent;
        }

        tables.check_category(&updated)?;
        if let Some(Some(parent)) = changes.parent_category_id {
            if tables.store_tree(updated.store_id).is_in_subtree(id, parent) {
                return Err(DatabaseError::CheckViolation(constraints::CATEGORIES_PARENT_CYCLE.to_string()));
            }
        }
        tables.categories[position] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(store_id) = tables.categories.iter().find(|c| c.id == id).map(|c| c.store_id) else {
            return Ok(false);
        };
        tables.remove_category_tree(id, store_id);
        Ok(true)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Sort;

    fn owner(username: &str) -> Owner {
        Owner::new("", "Test Owner", username, "password", 4).unwrap()
    }

    fn store_query() -> StoreQuery {
        StoreQuery {
            id: None,
            owner_id: None,
            text: None,
            pagination: Pagination::default(),
            sort: Sort::new(StoreSortField::Name, SortDirection::Asc),
        }
    }

    #[tokio::test]
    async fn enforces_unique_username() {
        let storage = MemoryStorage::new();
        OwnerRepository::create(&storage, &owner("owner_one")).await.unwrap();
        let err = OwnerRepository::create(&storage, &owner("owner_one")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(c) if c == constraints::OWNERS_USERNAME));
    }

    #[tokio::test]
    async fn store_text_search_matches_whole_words() {
        let storage = MemoryStorage::new();
        let o = owner("owner_one");
        OwnerRepository::create(&storage, &o).await.unwrap();
        StoreRepository::create(&storage, &Store::new(o.id, "Red Shoes", "sneakers and boots"))
            .await
            .unwrap();
        StoreRepository::create(&storage, &Store::new(o.id, "Blue Hats", "caps"))
            .await
            .unwrap();

        let mut query = store_query();
        query.text = Some("shoes BOOTS".to_string());
        let found = StoreRepository::read_by(&storage, &query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Red Shoes");
        assert_eq!(found[0].owner.as_ref().unwrap().username, "owner_one");

        query.text = Some("sho".to_string());
        assert!(StoreRepository::read_by(&storage, &query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_parent_from_another_store() {
        let storage = MemoryStorage::new();
        let o = owner("owner_one");
        OwnerRepository::create(&storage, &o).await.unwrap();
        let first = Store::new(o.id, "First", "");
        let second = Store::new(o.id, "Second", "");
        StoreRepository::create(&storage, &first).await.unwrap();
        StoreRepository::create(&storage, &second).await.unwrap();

        let parent = Category::new(first.id, None, "Parent", None);
        CategoryRepository::create(&storage, &parent).await.unwrap();

        let child = Category::new(second.id, Some(parent.id), "Child", None);
        let err = CategoryRepository::create(&storage, &child).await.unwrap_err();
        assert!(matches!(err, DatabaseError::ForeignKeyViolation(c) if c == constraints::CATEGORIES_PARENT));
    }

    #[tokio::test]
    async fn update_refuses_parent_loops() {
        let storage = MemoryStorage::new();
        let o = owner("owner_one");
        OwnerRepository::create(&storage, &o).await.unwrap();
        let store = Store::new(o.id, "Shop", "");
        StoreRepository::create(&storage, &store).await.unwrap();

        let root = Category::new(store.id, None, "Root", None);
        let child = Category::new(store.id, Some(root.id), "Child", None);
        for c in [&root, &child] {
            CategoryRepository::create(&storage, c).await.unwrap();
        }

        for parent in [root.id, child.id] {
            let changes = CategoryChanges {
                parent_category_id: Some(Some(parent)),
                ..Default::default()
            };
            let err = CategoryRepository::update(&storage, root.id, &changes).await.unwrap_err();
            assert!(matches!(err, DatabaseError::CheckViolation(c) if c == constraints::CATEGORIES_PARENT_CYCLE));
        }

        let unchanged = storage.list_by_store(store.id).await.unwrap();
        let root_now = unchanged.iter().find(|c| c.id == root.id).unwrap();
        assert_eq!(root_now.parent_category_id, None);
    }

    #[tokio::test]
    async fn deleting_category_removes_its_subtree() {
        let storage = MemoryStorage::new();
        let o = owner("owner_one");
        OwnerRepository::create(&storage, &o).await.unwrap();
        let store = Store::new(o.id, "Shop", "");
        StoreRepository::create(&storage, &store).await.unwrap();

        let root = Category::new(store.id, None, "Root", None);
        let child = Category::new(store.id, Some(root.id), "Child", None);
        let other = Category::new(store.id, None, "Other", None);
        for c in [&root, &child, &other] {
            CategoryRepository::create(&storage, c).await.unwrap();
        }

        assert!(CategoryRepository::delete(&storage, root.id).await.unwrap());
        let left = storage.list_by_store(store.id).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, other.id);
        assert!(!CategoryRepository::delete(&storage, root.id).await.unwrap());
    }
}
