use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::seller::Seller;

/// Shortest password the entity itself accepts. Request validation is stricter.
pub const MIN_PASSWORD_LENGTH: usize = 5;

#[derive(Debug, Error)]
pub enum OwnerError {
    #[error("password must contain at least {} characters", MIN_PASSWORD_LENGTH)]
    PasswordTooShort,

    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

/// Account holder who owns stores.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: Uuid,
    pub phone_number: String,
    pub full_name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sellers: Vec<Seller>,
    pub created_at: DateTime<Utc>,
}

impl Owner {
    /// Build a new owner, hashing the plain password with the given bcrypt cost.
    ///
    /// bcrypt is CPU bound; async callers should run this on a blocking thread.
    pub fn new(
        phone_number: impl Into<String>,
        full_name: impl Into<String>,
        username: impl Into<String>,
        password: &str,
        hash_cost: u32,
    ) -> Result<Self, OwnerError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(OwnerError::PasswordTooShort);
        }

        let password_hash = bcrypt::hash(password, hash_cost)?;

        Ok(Self {
            id: Uuid::new_v4(),
            phone_number: phone_number.into(),
            full_name: full_name.into(),
            username: username.into(),
            password_hash,
            sellers: Vec::new(),
            created_at: Utc::now(),
        })
    }

    /// Compare a plain password against the stored hash.
    pub fn verify_password(&self, password: &str) -> Result<bool, OwnerError> {
        Ok(bcrypt::verify(password, &self.password_hash)?)
    }
}
