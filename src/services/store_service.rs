use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::database::{DatabaseError, StoreChanges, StoreQuery, StoreRepository, StoreSortField};
use crate::entities::Store;
use crate::filter::{Pagination, Sort};
use crate::services::error::{ServiceError, ServiceResult};
use crate::validation::field_errors;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStoreInput {
    #[validate(length(min = 3))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateStoreInput {
    #[validate(length(min = 3))]
    pub name: Option<String>,
    #[validate(length(min = 3))]
    pub description: Option<String>,
}

/// Query string accepted by `GET /stores`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StoreReadBy {
    pub id: Option<Uuid>,
    #[validate(length(max = 255))]
    pub text: Option<String>,
    #[serde(rename = "ownerID")]
    pub owner_id: Option<Uuid>,
    pub page_number: Option<u64>,
    pub page_size: Option<u64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl StoreReadBy {
    fn into_query(self) -> ServiceResult<StoreQuery> {
        if let Some(id) = self.id {
            return Ok(StoreQuery::by_id(id));
        }

        if let Err(errors) = self.validate() {
            return Err(ServiceError::Validation(field_errors(&errors)));
        }

        Ok(StoreQuery {
            id: None,
            owner_id: self.owner_id,
            text: self.text.filter(|t| !t.trim().is_empty()),
            pagination: Pagination::from_request(self.page_number, self.page_size)?,
            sort: Sort::from_request(
                self.sort_by.as_deref(),
                self.sort_order.as_deref(),
                StoreSortField::CreatedAt,
            )?,
        })
    }
}

pub struct StoreService {
    stores: Arc<dyn StoreRepository>,
}

impl StoreService {
    pub fn new(stores: Arc<dyn StoreRepository>) -> Self {
        Self { stores }
    }

    /// `owner_id` always comes from the caller's access token.
    pub async fn create(&self, owner_id: Uuid, input: CreateStoreInput) -> ServiceResult<Store> {
        if let Err(errors) = input.validate() {
            debug!(stage = "validation", "create store input rejected");
            return Err(ServiceError::Validation(field_errors(&errors)));
        }

        let store = Store::new(owner_id, input.name, input.description);
        match self.stores.create(&store).await {
            Ok(()) => {}
            Err(DatabaseError::ForeignKeyViolation(_)) => return Err(ServiceError::NotFound("owner")),
            Err(e) => return Err(e.into()),
        }

        info!(stage = "success", store_id = %store.id, owner_id = %owner_id, "store created");
        self.read(store.id).await
    }

    pub async fn read_by(&self, read_by: StoreReadBy) -> ServiceResult<Vec<Store>> {
        let query = read_by.into_query()?;
        Ok(self.stores.read_by(&query).await?)
    }

    pub async fn read(&self, id: Uuid) -> ServiceResult<Store> {
        self.stores
            .read_by(&StoreQuery::by_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or(ServiceError::NotFound("store"))
    }

    pub async fn update(&self, owner_id: Uuid, id: Uuid, input: UpdateStoreInput) -> ServiceResult<Store> {
        if let Err(errors) = input.validate() {
            return Err(ServiceError::Validation(field_errors(&errors)));
        }

        let changes = StoreChanges {
            name: input.name,
            description: input.description,
        };
        if changes.is_empty() {
            return Err(ServiceError::validation("changes", "at least one field must be changed"));
        }

        let store = self
            .stores
            .update(owner_id, id, &changes)
            .await?
            .ok_or(ServiceError::NotFound("store"))?;

        info!(stage = "success", store_id = %id, "store updated");
        Ok(store)
    }

    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> ServiceResult<()> {
        if !self.stores.delete(owner_id, id).await? {
            return Err(ServiceError::NotFound("store"));
        }
        info!(stage = "success", store_id = %id, "store deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Repositories;
    use crate::entities::Owner;

    async fn setup() -> (StoreService, Uuid) {
        let repos = Repositories::in_memory();
        let owner = Owner::new("", "Store Owner", "store_owner", "secret123", 4).unwrap();
        repos.owners.create(&owner).await.unwrap();
        (StoreService::new(repos.stores), owner.id)
    }

    fn create_input(name: &str) -> CreateStoreInput {
        CreateStoreInput {
            name: name.to_string(),
            description: "shoes and bags".to_string(),
        }
    }

    #[tokio::test]
    async fn create_fills_owner_summary() {
        let (service, owner_id) = setup().await;
        let store = service.create(owner_id, create_input("Bazaar")).await.unwrap();
        let owner = store.owner.unwrap();
        assert_eq!(owner.id, owner_id);
        assert_eq!(owner.username, "store_owner");
    }

    #[tokio::test]
    async fn create_for_missing_owner_is_not_found() {
        let (service, _) = setup().await;
        let err = service.create(Uuid::new_v4(), create_input("Bazaar")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("owner")));
    }

    #[tokio::test]
    async fn update_without_changes_is_rejected() {
        let (service, owner_id) = setup().await;
        let store = service.create(owner_id, create_input("Bazaar")).await.unwrap();

        match service.update(owner_id, store.id, UpdateStoreInput::default()).await {
            Err(ServiceError::Validation(fields)) => assert!(fields.contains_key("changes")),
            other => panic!("unexpected {:?}", other.map(|s| s.id)),
        }
    }

    #[tokio::test]
    async fn update_is_owner_scoped() {
        let (service, owner_id) = setup().await;
        let store = service.create(owner_id, create_input("Bazaar")).await.unwrap();

        let input = UpdateStoreInput {
            name: Some("Renamed".to_string()),
            description: None,
        };
        let err = service.update(Uuid::new_v4(), store.id, input.clone()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("store")));

        let updated = service.update(owner_id, store.id, input).await.unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.description, "shoes and bags");
    }

    #[tokio::test]
    async fn read_by_validates_paging() {
        let (service, _) = setup().await;
        for size in [0, 1000] {
            let read_by = StoreReadBy {
                page_size: Some(size),
                ..Default::default()
            };
            match service.read_by(read_by).await {
                Err(ServiceError::Validation(fields)) => assert!(fields.contains_key("pageSize")),
                other => panic!("unexpected {:?}", other.map(|s| s.len())),
            }
        }
    }

    #[tokio::test]
    async fn delete_twice_is_not_found() {
        let (service, owner_id) = setup().await;
        let store = service.create(owner_id, create_input("Bazaar")).await.unwrap();

        service.delete(owner_id, store.id).await.unwrap();
        assert!(matches!(
            service.delete(owner_id, store.id).await,
            Err(ServiceError::NotFound("store"))
        ));
        assert!(matches!(service.read(store.id).await, Err(ServiceError::NotFound("store"))));
    }
}
