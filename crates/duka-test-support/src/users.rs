//! In-memory account store.

use async_trait::async_trait;
use duka_auth::{AuthError, User, UserRepository};
use duka_commerce::ids::UserId;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
pub struct InMemoryUsers {
    users: Mutex<Vec<User>>,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: &User) -> Result<(), AuthError> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        if users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken(user.email.clone()));
        }
        users.push(user.clone());
        Ok(())
    }
}
