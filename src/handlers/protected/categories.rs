// handlers/protected/categories.rs - /categories, /categories/tree and /categories/:id
//
// Any signed-in owner can read categories. Create, update and delete only
// reach the caller's own stores.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{ApiJson, ApiPath, ApiQuery};
use crate::app::AppState;
use crate::entities::Category;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{CategoryReadBy, CreateCategoryInput, UpdateCategoryInput};

#[derive(Debug, Deserialize)]
pub struct TreeQuery {
    #[serde(rename = "storeID")]
    pub store_id: Uuid,
}

/// GET /categories?id=&storeID=&text=&parentCategoryID=&pageNumber=&pageSize=&sortBy=&sortOrder=
///
/// With `id` present every other parameter is ignored.
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(read_by): ApiQuery<CategoryReadBy>,
) -> ApiResult<Vec<Category>> {
    let categories = state.services.categories.read_by(read_by).await?;
    Ok(ApiResponse::success(categories))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(input): ApiJson<CreateCategoryInput>,
) -> ApiResult<Category> {
    let category = state.services.categories.create(user.user_id, input).await?;
    Ok(ApiResponse::created(category))
}

/// GET /categories/tree?storeID= - the store's categories nested under their parents
pub async fn tree(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TreeQuery>,
) -> Result<Response, ApiError> {
    let tree = state.services.categories.tree(query.store_id).await?;
    Ok(ApiResponse::success(tree.to_nested()).into_response())
}

pub async fn show(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Category> {
    let category = state.services.categories.read(id).await?;
    Ok(ApiResponse::success(category))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateCategoryInput>,
) -> ApiResult<Category> {
    let category = state.services.categories.update(user.user_id, id, input).await?;
    Ok(ApiResponse::success(category))
}

/// DELETE /categories/:id - also removes every descendant
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    state.services.categories.delete(user.user_id, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
