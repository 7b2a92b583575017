use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("data integrity error: {0}")]
    Integrity(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn conflict(msg: impl Into<String>) -> Self { Self::Conflict(msg.into()) }

    pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }

    pub fn forbidden(msg: impl Into<String>) -> Self { Self::Forbidden(msg.into()) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 2001,
            ServiceError::NotFound(_) => 2002,
            ServiceError::Conflict(_) => 2003,
            ServiceError::Forbidden(_) => 2004,
            ServiceError::Integrity(_) => 2101,
            ServiceError::Db(_) => 2200,
        }
    }
}

impl From<models::errors::ModelError> for ServiceError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::Validation(msg) => ServiceError::Validation(msg),
            models::errors::ModelError::Db(msg) => ServiceError::Db(msg),
        }
    }
}

/// Uniqueness violations surface as `Conflict`: the unique indexes are the
/// concurrency control for claims, slugs and business keys.
impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => ServiceError::Conflict(format!("duplicate entry: {msg}")),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => ServiceError::Conflict(format!("reference violation: {msg}")),
            _ => ServiceError::Db(e.to_string()),
        }
    }
}
