//! Database error types.

use duka_auth::AuthError;
use duka_commerce::error::CommerceError;
use thiserror::Error;

/// Errors that can occur when using the database.
#[derive(Error, Debug)]
pub enum DbError {
    /// Unique constraint violated.
    #[error("Duplicate value: {0}")]
    Conflict(String),

    /// A stored value could not be turned back into a domain type.
    #[error("Corrupt row: {0}")]
    Decode(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                let target = db.constraint().unwrap_or("unique key").to_string();
                return DbError::Conflict(target);
            }
        }
        DbError::Sqlx(e)
    }
}

impl From<DbError> for CommerceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Conflict(target) => CommerceError::Conflict(format!("{target} is already in use")),
            other => CommerceError::Storage(other.to_string()),
        }
    }
}

impl From<DbError> for AuthError {
    fn from(e: DbError) -> Self {
        AuthError::Storage(e.to_string())
    }
}
