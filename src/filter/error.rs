use thiserror::Error;

use super::pagination::MAX_PAGE_SIZE;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    #[error("page number is out of range")]
    InvalidPageNumber,

    #[error("page size must be between 1 and {}", MAX_PAGE_SIZE)]
    InvalidPageSize,

    #[error("unknown sort field: {0}")]
    UnknownSortField(String),

    #[error("sort order must be asc or desc, got: {0}")]
    InvalidSortOrder(String),
}

impl FilterError {
    /// Query field the error belongs to, `None` for builder misuse.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            FilterError::InvalidPageNumber => Some("pageNumber"),
            FilterError::InvalidPageSize => Some("pageSize"),
            FilterError::UnknownSortField(_) => Some("sortBy"),
            FilterError::InvalidSortOrder(_) => Some("sortOrder"),
            FilterError::InvalidTableName(_) | FilterError::InvalidColumn(_) => None,
        }
    }
}
