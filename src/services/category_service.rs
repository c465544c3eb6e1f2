use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::database::{
    constraints, CategoryChanges, CategoryQuery, CategoryRepository, CategorySortField, DatabaseError, StoreQuery,
    StoreRepository,
};
use crate::entities::{Category, CategoryTree};
use crate::filter::{Pagination, Sort};
use crate::services::error::{ServiceError, ServiceResult};
use crate::validation::{double_option, field_errors};

const MAX_ARTICLE_LENGTH: usize = 100;
const STORE_MISSING: &str = "store does not exist";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 100))]
    pub article: Option<String>,
    #[serde(rename = "storeID")]
    pub store_id: Uuid,
    #[serde(default, rename = "parentCategoryID")]
    pub parent_category_id: Option<Uuid>,
}

/// `null` clears `article` / `parentCategoryID`, an absent key leaves them alone.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub article: Option<Option<String>>,
    #[serde(default, rename = "parentCategoryID", deserialize_with = "double_option")]
    pub parent_category_id: Option<Option<Uuid>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReadBy {
    pub id: Option<Uuid>,
    #[serde(rename = "storeID")]
    pub store_id: Option<Uuid>,
    #[validate(length(max = 255))]
    pub text: Option<String>,
    #[serde(rename = "parentCategoryID")]
    pub parent_category_id: Option<Uuid>,
    pub page_number: Option<u64>,
    pub page_size: Option<u64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl CategoryReadBy {
    /// A present `id` short-circuits everything else, including paging and sort validation.
    fn into_query(self) -> ServiceResult<CategoryQuery> {
        if let Some(id) = self.id {
            return Ok(CategoryQuery::by_id(id));
        }

        if let Err(errors) = self.validate() {
            return Err(ServiceError::Validation(field_errors(&errors)));
        }

        Ok(CategoryQuery {
            id: None,
            store_id: self.store_id,
            parent_category_id: self.parent_category_id,
            text: self.text.filter(|t| !t.trim().is_empty()),
            pagination: Pagination::from_request(self.page_number, self.page_size)?,
            sort: Sort::from_request(
                self.sort_by.as_deref(),
                self.sort_order.as_deref(),
                CategorySortField::CreatedAt,
            )?,
        })
    }
}

/// Reads are open to every signed-in owner. Writes only reach categories in
/// stores the caller owns.
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    stores: Arc<dyn StoreRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>, stores: Arc<dyn StoreRepository>) -> Self {
        Self { categories, stores }
    }

    /// A store the caller does not own is reported like a missing one.
    pub async fn create(&self, owner_id: Uuid, input: CreateCategoryInput) -> ServiceResult<Category> {
        if let Err(errors) = input.validate() {
            debug!(stage = "validation", "create category input rejected");
            return Err(ServiceError::Validation(field_errors(&errors)));
        }
        if !self.owns_store(owner_id, input.store_id).await? {
            debug!(stage = "authorization", store_id = %input.store_id, "store missing or owned by someone else");
            return Err(ServiceError::validation("storeID", STORE_MISSING));
        }

        let category = Category::new(input.store_id, input.parent_category_id, input.name, input.article);
        self.categories.create(&category).await.map_err(write_error)?;

        info!(stage = "success", category_id = %category.id, store_id = %category.store_id, "category created");
        Ok(category)
    }

    pub async fn read_by(&self, read_by: CategoryReadBy) -> ServiceResult<Vec<Category>> {
        let query = read_by.into_query()?;
        Ok(self.categories.read_by(&query).await?)
    }

    pub async fn read(&self, id: Uuid) -> ServiceResult<Category> {
        self.categories
            .read_by(&CategoryQuery::by_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or(ServiceError::NotFound("category"))
    }

    pub async fn update(&self, owner_id: Uuid, id: Uuid, input: UpdateCategoryInput) -> ServiceResult<Category> {
        if let Err(errors) = input.validate() {
            return Err(ServiceError::Validation(field_errors(&errors)));
        }
        if let Some(Some(article)) = &input.article {
            if article.chars().count() > MAX_ARTICLE_LENGTH {
                return Err(ServiceError::validation(
                    "article",
                    format!("must be at most {} characters", MAX_ARTICLE_LENGTH),
                ));
            }
        }

        let changes = CategoryChanges {
            name: input.name,
            article: input.article,
            parent_category_id: input.parent_category_id,
        };
        if changes.is_empty() {
            return Err(ServiceError::validation("changes", "at least one field must be changed"));
        }

        self.owned(owner_id, id).await?;
        let category = self
            .categories
            .update(id, &changes)
            .await
            .map_err(write_error)?
            .ok_or(ServiceError::NotFound("category"))?;

        info!(stage = "success", category_id = %id, "category updated");
        Ok(category)
    }

    /// Removes the category together with its whole subtree.
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> ServiceResult<()> {
        self.owned(owner_id, id).await?;
        if !self.categories.delete(id).await? {
            return Err(ServiceError::NotFound("category"));
        }
        info!(stage = "success", category_id = %id, "category deleted");
        Ok(())
    }

    pub async fn tree(&self, store_id: Uuid) -> ServiceResult<CategoryTree> {
        let categories = self.categories.list_by_store(store_id).await?;
        Ok(CategoryTree::build(categories))
    }

    async fn owns_store(&self, owner_id: Uuid, store_id: Uuid) -> ServiceResult<bool> {
        let store = self.stores.read_by(&StoreQuery::by_id(store_id)).await?.into_iter().next();
        Ok(store.is_some_and(|s| s.owner_id == owner_id))
    }

    /// Someone else's category looks exactly like a missing one.
    async fn owned(&self, owner_id: Uuid, id: Uuid) -> ServiceResult<Category> {
        let category = self.read(id).await?;
        if !self.owns_store(owner_id, category.store_id).await? {
            debug!(stage = "authorization", category_id = %id, "category belongs to another owner");
            return Err(ServiceError::NotFound("category"));
        }
        Ok(category)
    }
}

fn write_error(err: DatabaseError) -> ServiceError {
    match &err {
        DatabaseError::ForeignKeyViolation(c) if c == constraints::CATEGORIES_STORE => {
            ServiceError::validation("storeID", STORE_MISSING)
        }
        DatabaseError::ForeignKeyViolation(c) if c == constraints::CATEGORIES_PARENT => {
            ServiceError::validation("parentCategoryID", "parent category must exist in the same store")
        }
        DatabaseError::UniqueViolation(c) if c == constraints::CATEGORIES_ARTICLE => {
            ServiceError::validation("article", "article is already in use")
        }
        DatabaseError::CheckViolation(c) if c == constraints::CATEGORIES_PARENT_CYCLE => {
            ServiceError::validation("parentCategoryID", "category cannot be moved under itself or its descendants")
        }
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Repositories;
    use crate::entities::{Owner, Store};

    struct Fixture {
        service: CategoryService,
        repos: Repositories,
        owner_id: Uuid,
        store_id: Uuid,
    }

    async fn add_owner(repos: &Repositories, username: &str) -> Uuid {
        let owner = Owner::new("", "Category Owner", username, "secret123", 4).unwrap();
        repos.owners.create(&owner).await.unwrap();
        owner.id
    }

    async fn add_store(repos: &Repositories, owner_id: Uuid) -> Uuid {
        let store = Store::new(owner_id, "Bazaar", "");
        repos.stores.create(&store).await.unwrap();
        store.id
    }

    async fn setup() -> Fixture {
        let repos = Repositories::in_memory();
        let owner_id = add_owner(&repos, "category_owner").await;
        let store_id = add_store(&repos, owner_id).await;
        Fixture {
            service: CategoryService::new(repos.categories.clone(), repos.stores.clone()),
            repos,
            owner_id,
            store_id,
        }
    }

    fn input(store_id: Uuid, parent: Option<Uuid>, name: &str, article: Option<&str>) -> CreateCategoryInput {
        CreateCategoryInput {
            name: name.to_string(),
            article: article.map(str::to_string),
            store_id,
            parent_category_id: parent,
        }
    }

    fn reparent(parent: Option<Uuid>) -> UpdateCategoryInput {
        UpdateCategoryInput {
            parent_category_id: Some(parent),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_reports_field_errors() {
        let Fixture { service, owner_id, store_id, .. } = setup().await;

        let err = service.create(owner_id, input(Uuid::new_v4(), None, "Shoes", None)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(f) if f.contains_key("storeID")));

        let err = service
            .create(owner_id, input(store_id, Some(Uuid::new_v4()), "Shoes", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(f) if f.contains_key("parentCategoryID")));

        service.create(owner_id, input(store_id, None, "Shoes", Some("SH-1"))).await.unwrap();
        let err = service.create(owner_id, input(store_id, None, "Boots", Some("SH-1"))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(f) if f.contains_key("article")));
    }

    #[tokio::test]
    async fn writes_are_limited_to_own_stores() {
        let Fixture { service, repos, owner_id, store_id } = setup().await;
        let shoes = service.create(owner_id, input(store_id, None, "Shoes", None)).await.unwrap();
        let intruder = add_owner(&repos, "intruder_1").await;

        let err = service.create(intruder, input(store_id, None, "Planted", None)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(f) if f.contains_key("storeID")));

        let rename = UpdateCategoryInput {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let err = service.update(intruder, shoes.id, rename).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("category")));

        let err = service.delete(intruder, shoes.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("category")));

        assert_eq!(service.read(shoes.id).await.unwrap().name, "Shoes");
    }

    #[tokio::test]
    async fn read_by_id_ignores_other_filters() {
        let Fixture { service, owner_id, store_id, .. } = setup().await;
        let shoes = service.create(owner_id, input(store_id, None, "Shoes", None)).await.unwrap();

        let read_by = CategoryReadBy {
            id: Some(shoes.id),
            store_id: Some(Uuid::new_v4()),
            text: Some("nothing like it".to_string()),
            page_size: Some(0),
            sort_by: Some("bogus".to_string()),
            ..Default::default()
        };
        let found = service.read_by(read_by).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, shoes.id);
    }

    #[tokio::test]
    async fn update_rejects_cycles() {
        let Fixture { service, owner_id, store_id, .. } = setup().await;
        let shoes = service.create(owner_id, input(store_id, None, "Shoes", None)).await.unwrap();
        let boots = service.create(owner_id, input(store_id, Some(shoes.id), "Boots", None)).await.unwrap();

        let err = service.update(owner_id, shoes.id, reparent(Some(shoes.id))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(f) if f.contains_key("parentCategoryID")));

        let err = service.update(owner_id, shoes.id, reparent(Some(boots.id))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(f) if f.contains_key("parentCategoryID")));

        let boots = service.update(owner_id, boots.id, reparent(None)).await.unwrap();
        assert_eq!(boots.parent_category_id, None);
    }

    #[tokio::test]
    async fn concurrent_swaps_cannot_both_succeed() {
        let Fixture { service, owner_id, store_id, .. } = setup().await;
        let a = service.create(owner_id, input(store_id, None, "A", None)).await.unwrap();
        let b = service.create(owner_id, input(store_id, None, "B", None)).await.unwrap();

        let (a_under_b, b_under_a) = tokio::join!(
            service.update(owner_id, a.id, reparent(Some(b.id))),
            service.update(owner_id, b.id, reparent(Some(a.id))),
        );
        assert!(a_under_b.is_ok() != b_under_a.is_ok());

        let tree = service.tree(store_id).await.unwrap();
        assert_eq!(tree.roots().count(), 1);
    }

    #[tokio::test]
    async fn update_without_changes_is_rejected() {
        let Fixture { service, owner_id, store_id, .. } = setup().await;
        let shoes = service.create(owner_id, input(store_id, None, "Shoes", None)).await.unwrap();
        let err = service
            .update(owner_id, shoes.id, UpdateCategoryInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(f) if f.contains_key("changes")));
    }

    #[tokio::test]
    async fn tree_nests_children_and_delete_cascades() {
        let Fixture { service, owner_id, store_id, .. } = setup().await;
        let shoes = service.create(owner_id, input(store_id, None, "Shoes", None)).await.unwrap();
        service.create(owner_id, input(store_id, Some(shoes.id), "Boots", None)).await.unwrap();
        service.create(owner_id, input(store_id, None, "Bags", None)).await.unwrap();

        let tree = service.tree(store_id).await.unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.children(shoes.id).count(), 1);

        service.delete(owner_id, shoes.id).await.unwrap();
        assert_eq!(service.tree(store_id).await.unwrap().len(), 1);
        assert!(matches!(service.delete(owner_id, shoes.id).await, Err(ServiceError::NotFound("category"))));
    }
}
