// handlers/public/auth.rs - POST /auth/{register,login,refresh,logout}
//
// Register and login hand back the session pair in the body and also set the
// refresh token as an HttpOnly cookie. Refresh tries the token from that
// cookie first, falls back to a JSON body when the cookie is missing or
// rejected, and rotates both.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::debug;

use crate::api::ApiJson;
use crate::app::AppState;
use crate::auth::Session;
use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::services::{LoginInput, RegisterInput, ServiceError};

pub const REFRESH_COOKIE: &str = "refresh_token";

#[derive(Debug, Deserialize)]
struct RefreshInput {
    #[serde(rename = "refreshToken")]
    refresh_token: String,
}

/// POST /auth/register - create an owner account and start a session
pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.services.auth.register(input).await?;
    let cookie = refresh_cookie(&session.refresh_token, &state.config.security);
    Ok(([(header::SET_COOKIE, cookie)], ApiResponse::created(session)))
}

/// POST /auth/login - exchange username and password for a session
pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.services.auth.login(input).await?;
    Ok(with_cookie(session, &state.config.security))
}

/// POST /auth/refresh - rotate the session pair
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let security = &state.config.security;

    if let Some(token) = cookie_value(&headers, REFRESH_COOKIE) {
        match state.services.auth.refresh(&token).await {
            Ok(session) => return Ok(with_cookie(session, security)),
            Err(ServiceError::InvalidRefreshToken) if !body.is_empty() => {
                debug!("refresh cookie rejected, trying request body");
            }
            Err(e) => return Err(e.into()),
        }
    }

    if body.is_empty() {
        return Err(ServiceError::InvalidRefreshToken.into());
    }
    let input: RefreshInput = serde_json::from_slice(&body).map_err(|e| ApiError::invalid_json(e.to_string()))?;
    let session = state.services.auth.refresh(&input.refresh_token).await?;
    Ok(with_cookie(session, security))
}

/// POST /auth/logout - drop the refresh cookie; tokens themselves stay valid until expiry
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = build_cookie("", 0, state.config.security.secure_cookies);
    ([(header::SET_COOKIE, cookie)], ApiResponse::<()>::no_content())
}

fn with_cookie(session: Session, security: &SecurityConfig) -> impl IntoResponse {
    let cookie = refresh_cookie(&session.refresh_token, security);
    ([(header::SET_COOKIE, cookie)], ApiResponse::success(session))
}

fn refresh_cookie(token: &str, security: &SecurityConfig) -> String {
    build_cookie(token, security.refresh_token_ttl_secs, security.secure_cookies)
}

fn build_cookie(value: &str, max_age: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        REFRESH_COOKIE, value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// First non-empty value of the named cookie across all `Cookie` headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
