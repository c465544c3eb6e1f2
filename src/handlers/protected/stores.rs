// handlers/protected/stores.rs - /stores and /stores/:id
//
// Ownership always comes from the access token. Update and delete only
// reach stores the caller owns; anything else looks like a 404.

use axum::{extract::State, Extension};
use uuid::Uuid;

use crate::api::{ApiJson, ApiPath, ApiQuery};
use crate::app::AppState;
use crate::entities::Store;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{CreateStoreInput, StoreReadBy, UpdateStoreInput};

/// GET /stores?text=&ownerID=&pageNumber=&pageSize=&sortBy=&sortOrder=
pub async fn list(State(state): State<AppState>, ApiQuery(read_by): ApiQuery<StoreReadBy>) -> ApiResult<Vec<Store>> {
    let stores = state.services.stores.read_by(read_by).await?;
    Ok(ApiResponse::success(stores))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(input): ApiJson<CreateStoreInput>,
) -> ApiResult<Store> {
    let store = state.services.stores.create(user.user_id, input).await?;
    Ok(ApiResponse::created(store))
}

pub async fn show(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Store> {
    let store = state.services.stores.read(id).await?;
    Ok(ApiResponse::success(store))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateStoreInput>,
) -> ApiResult<Store> {
    let store = state.services.stores.update(user.user_id, id, input).await?;
    Ok(ApiResponse::success(store))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    state.services.stores.delete(user.user_id, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
