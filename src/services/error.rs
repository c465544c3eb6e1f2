use thiserror::Error;

use crate::database::DatabaseError;
use crate::filter::FilterError;
use crate::validation::{self, FieldErrors};

/// Message every unexpected failure collapses to.
pub const INTERNAL_MESSAGE: &str = "something went wrong";

/// Errors surfaced by the domain services.
///
/// Everything except `Internal` is safe to show to the client verbatim.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("username is already taken")]
    UsernameTaken,

    #[error("wrong username or password")]
    InvalidCredentials,

    #[error("invalid refresh token")]
    InvalidRefreshToken,

    #[error("invalid access token")]
    InvalidAccessToken,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed")]
    Validation(FieldErrors),

    #[error("{}", INTERNAL_MESSAGE)]
    Internal,
}

impl ServiceError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        ServiceError::Validation(validation::single(field, message))
    }

    /// Log the real cause and hand back the opaque error.
    pub fn internal(err: impl std::fmt::Display, stage: &'static str) -> Self {
        tracing::error!(stage, error = %err, "unexpected failure");
        ServiceError::Internal
    }
}

impl From<FilterError> for ServiceError {
    fn from(err: FilterError) -> Self {
        match err.field() {
            Some(field) => ServiceError::validation(field, err.to_string()),
            None => ServiceError::internal(err, "query"),
        }
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::QueryError(filter) => filter.into(),
            other => ServiceError::internal(other, "repository"),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
