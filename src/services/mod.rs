pub mod auth_service;
pub mod category_service;
pub mod error;
pub mod store_service;

pub use auth_service::{AuthService, LoginInput, RegisterInput};
pub use category_service::{CategoryReadBy, CategoryService, CreateCategoryInput, UpdateCategoryInput};
pub use error::{ServiceError, ServiceResult};
pub use store_service::{CreateStoreInput, StoreReadBy, StoreService, UpdateStoreInput};

use chrono::Duration;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::SessionIssuer;
use crate::config::{AppConfig, MIN_SECRET_LEN};
use crate::database::{DatabaseError, Repositories, Storage};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DependencyError {
    #[error("signing secret must be at least {} bytes", MIN_SECRET_LEN)]
    WeakSecret,

    #[error("token TTL out of range: {0}s")]
    InvalidTokenTtl(u64),
}

/// All domain services, built once at startup and shared behind `Arc`.
pub struct Services {
    pub auth: AuthService,
    pub stores: StoreService,
    pub categories: CategoryService,
    storage: Arc<dyn Storage>,
}

impl Services {
    pub fn new(repos: Repositories, config: &AppConfig) -> Result<Self, DependencyError> {
        let security = &config.security;
        if security.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(DependencyError::WeakSecret);
        }

        let issuer = SessionIssuer::new(
            security.jwt_secret.as_bytes(),
            ttl(security.access_token_ttl_secs)?,
            ttl(security.refresh_token_ttl_secs)?,
        );

        Ok(Self {
            auth: AuthService::new(repos.owners, issuer, security.password_hash_cost),
            categories: CategoryService::new(repos.categories, repos.stores.clone()),
            stores: StoreService::new(repos.stores),
            storage: repos.storage,
        })
    }

    pub async fn ping(&self) -> Result<(), DatabaseError> {
        self.storage.ping().await
    }

    pub async fn close(&self) {
        self.storage.close().await
    }
}

fn ttl(secs: u64) -> Result<Duration, DependencyError> {
    i64::try_from(secs)
        .ok()
        .filter(|s| *s > 0)
        .and_then(Duration::try_seconds)
        .ok_or(DependencyError::InvalidTokenTtl(secs))
}
