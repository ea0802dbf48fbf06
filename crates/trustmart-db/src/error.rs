//! Database error types.

use thiserror::Error;
use trustmart_common::MarketError;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl From<DbError> for MarketError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate(msg) => MarketError::Conflict(msg),
            DbError::InvalidQuery(msg) => MarketError::Validation(msg),
            other => MarketError::Internal(other.to_string()),
        }
    }
}
