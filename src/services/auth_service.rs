use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AccessClaims, RefreshClaims, Session, SessionIssuer};
use crate::database::{constraints, DatabaseError, OwnerRepository};
use crate::entities::{Owner, OwnerError};
use crate::services::error::{ServiceError, ServiceResult};
use crate::types::Role;
use crate::validation::field_errors;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 1, message = "is required"))]
    pub full_name: String,
    #[validate(length(min = 6, max = 500))]
    pub username: String,
    #[validate(length(min = 6, max = 500))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub phone_number: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1, message = "is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Registration, login and session rotation for owners.
pub struct AuthService {
    owners: Arc<dyn OwnerRepository>,
    issuer: SessionIssuer,
    hash_cost: u32,
}

impl AuthService {
    pub fn new(owners: Arc<dyn OwnerRepository>, issuer: SessionIssuer, hash_cost: u32) -> Self {
        Self { owners, issuer, hash_cost }
    }

    pub async fn register(&self, input: RegisterInput) -> ServiceResult<Session> {
        if let Err(errors) = input.validate() {
            debug!(stage = "validation", "register input rejected");
            return Err(ServiceError::Validation(field_errors(&errors)));
        }

        if self.owners.find_by_username(&input.username).await?.is_some() {
            debug!(stage = "repository", username = %input.username, "username already registered");
            return Err(ServiceError::UsernameTaken);
        }

        let cost = self.hash_cost;
        let owner = tokio::task::spawn_blocking(move || {
            Owner::new(input.phone_number, input.full_name, input.username, &input.password, cost)
        })
        .await
        .map_err(|e| ServiceError::internal(e, "hashing"))?
        .map_err(|e| match e {
            OwnerError::PasswordTooShort => ServiceError::validation("password", e.to_string()),
            OwnerError::Hashing(_) => ServiceError::internal(e, "hashing"),
        })?;

        match self.owners.create(&owner).await {
            Ok(()) => {}
            // a concurrent registration won the race
            Err(DatabaseError::UniqueViolation(c)) if c == constraints::OWNERS_USERNAME => {
                return Err(ServiceError::UsernameTaken);
            }
            Err(e) => return Err(e.into()),
        }

        info!(stage = "success", owner_id = %owner.id, "owner registered");
        self.issue(owner.id)
    }

    pub async fn login(&self, input: LoginInput) -> ServiceResult<Session> {
        if let Err(errors) = input.validate() {
            return Err(ServiceError::Validation(field_errors(&errors)));
        }

        let Some(owner) = self.owners.find_by_username(&input.username).await? else {
            warn!(stage = "repository", username = %input.username, "login for unknown username");
            return Err(ServiceError::InvalidCredentials);
        };

        let password = input.password;
        let (owner, matches) = tokio::task::spawn_blocking(move || {
            let matches = owner.verify_password(&password);
            (owner, matches)
        })
        .await
        .map_err(|e| ServiceError::internal(e, "hashing"))?;

        if !matches.map_err(|e| ServiceError::internal(e, "hashing"))? {
            warn!(stage = "validation", owner_id = %owner.id, "login with wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        info!(stage = "success", owner_id = %owner.id, "owner logged in");
        self.issue(owner.id)
    }

    /// Trade a valid refresh token for a brand-new session.
    ///
    /// Previously issued tokens stay valid until they expire; there is no
    /// revocation list.
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<Session> {
        let claims = self.parse_refresh_token(refresh_token)?;

        if self.owners.find_by_id(claims.user_id).await?.is_none() {
            warn!(stage = "repository", owner_id = %claims.user_id, "refresh for a missing owner");
            return Err(ServiceError::InvalidRefreshToken);
        }

        info!(stage = "success", owner_id = %claims.user_id, "session refreshed");
        self.issue(claims.user_id)
    }

    pub async fn me(&self, claims: &AccessClaims) -> ServiceResult<Owner> {
        self.owners
            .find_by_id(claims.user_id)
            .await?
            .ok_or(ServiceError::NotFound("owner"))
    }

    pub fn parse_access_token(&self, token: &str) -> ServiceResult<AccessClaims> {
        self.issuer.parse_access(token).map_err(|e| {
            debug!(stage = "jwt", error = %e, "access token rejected");
            ServiceError::InvalidAccessToken
        })
    }

    pub fn parse_refresh_token(&self, token: &str) -> ServiceResult<RefreshClaims> {
        self.issuer.parse_refresh(token).map_err(|e| {
            debug!(stage = "jwt", error = %e, "refresh token rejected");
            ServiceError::InvalidRefreshToken
        })
    }

    fn issue(&self, owner_id: Uuid) -> ServiceResult<Session> {
        self.issuer
            .issue(owner_id, Role::Owner)
            .map_err(|e| ServiceError::internal(e, "jwt"))
    }
}
