// handlers/protected/auth.rs - GET /auth/me

use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::entities::Owner;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// Profile of the owner behind the access token
pub async fn me(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Owner> {
    let owner = state.services.auth.me(&user.claims).await?;
    Ok(ApiResponse::success(owner))
}
