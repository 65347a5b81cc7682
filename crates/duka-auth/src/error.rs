//! Authentication errors.

use duka_commerce::validation::FieldErrors;
use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately does not say which.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// The request carries no signed-in session.
    #[error("Authentication required")]
    Unauthenticated,

    /// Signed in, but lacking the required role.
    #[error("Insufficient permissions")]
    Forbidden,

    /// Registration or login form failed validation.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Password hashing failed or a stored hash is malformed.
    #[error("Password hash error: {0}")]
    Hash(String),

    /// Session store failure.
    #[error("Cache error: {0}")]
    Cache(#[from] duka_cache::CacheError),

    /// User store failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// Check if this is an authentication failure (maps to 401).
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AuthError::InvalidCredentials | AuthError::Unauthenticated)
    }

    /// Check if this is a permission error (maps to 403).
    pub fn is_permission_error(&self) -> bool {
        matches!(self, AuthError::Forbidden)
    }
}

impl From<FieldErrors> for AuthError {
    fn from(errors: FieldErrors) -> Self {
        AuthError::Validation(errors)
    }
}
