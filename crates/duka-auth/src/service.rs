//! Register, login and logout flows.

use crate::password::PasswordHasher;
use crate::repository::UserRepository;
use crate::session::{AuthSession, SessionManager};
use crate::user::{normalize_email, Credentials, Role, User};
use crate::{AuthError, Registration};
use duka_commerce::clock::Clock;
use duka_commerce::ids::SessionId;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Account use cases.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: SessionManager,
    hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, sessions: SessionManager, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            sessions,
            hasher: PasswordHasher::new(),
            clock,
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Create an account without signing in. Used by registration and by
    /// the `create-admin` command.
    #[instrument(skip_all, fields(role = role.as_str()))]
    pub async fn create_user(&self, form: Registration, role: Role) -> Result<User, AuthError> {
        form.validate()?;
        let email = normalize_email(&form.email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken(email));
        }
        let hash = self.hasher.hash(&form.password)?;
        let user = form.into_user(hash, role, self.clock.now());
        self.users.create(&user).await?;
        info!(user_id = %user.id, "account created");
        Ok(user)
    }

    /// Create a customer account and sign it in, retiring `current`.
    pub async fn register(
        &self,
        form: Registration,
        current: Option<&SessionId>,
    ) -> Result<(User, AuthSession), AuthError> {
        let user = self.create_user(form, Role::Customer).await?;
        let session = self.sessions.sign_in(current, &user)?;
        Ok((user, session))
    }

    /// Check credentials and issue a signed-in session.
    #[instrument(skip_all)]
    pub async fn login(
        &self,
        credentials: Credentials,
        current: Option<&SessionId>,
    ) -> Result<(User, AuthSession), AuthError> {
        credentials.validate()?;
        let email = normalize_email(&credentials.email);
        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!("login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        if !self.hasher.verify(&credentials.password, &user.password_hash)? {
            warn!(user_id = %user.id, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        let session = self.sessions.sign_in(current, &user)?;
        Ok((user, session))
    }

    pub fn logout(&self, session: &SessionId) {
        if self.sessions.destroy(session) {
            info!(session_id = %session, "signed out");
        }
    }

    /// The account behind a session, if signed in and still present.
    pub async fn current_user(&self, session: &AuthSession) -> Result<Option<User>, AuthError> {
        match session.user_id {
            Some(id) => self.users.get(id).await,
            None => Ok(None),
        }
    }
}
