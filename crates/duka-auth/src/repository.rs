//! Account storage seam.

use crate::user::User;
use crate::AuthError;
use async_trait::async_trait;
use duka_commerce::ids::UserId;

/// Persistent account store.
///
/// Emails are stored normalized (see [`crate::user::normalize_email`]);
/// `create` fails with [`AuthError::EmailTaken`] on a duplicate.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    async fn get(&self, id: UserId) -> Result<Option<User>, AuthError>;

    async fn create(&self, user: &User) -> Result<(), AuthError>;
}
