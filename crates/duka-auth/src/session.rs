//! Session management on top of the key-value cache.

use crate::user::{Role, User};
use crate::AuthError;
use chrono::{DateTime, Duration, Utc};
use duka_cache::{cache_key, generate_token, Cache};
use duka_commerce::cart::CartOwner;
use duka_commerce::clock::Clock;
use duka_commerce::ids::{SessionId, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Default session lifetime: 7 days.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 7 * 24;

/// A browser session, guest or signed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub id: SessionId,
    pub user_id: Option<UserId>,
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_some_and(|r| r.has_permission(Role::Admin))
    }

    /// Whose cart this session reaches: the user's when signed in, else the
    /// guest cart keyed by the session id.
    pub fn owner(&self) -> CartOwner {
        match self.user_id {
            Some(user_id) => CartOwner::User(user_id),
            None => CartOwner::Guest(self.id.clone()),
        }
    }

    /// The signed-in user, or [`AuthError::Unauthenticated`].
    pub fn require_user(&self) -> Result<UserId, AuthError> {
        self.user_id.ok_or(AuthError::Unauthenticated)
    }

    /// Require an admin session.
    pub fn require_admin(&self) -> Result<UserId, AuthError> {
        let user_id = self.require_user()?;
        if self.is_admin() {
            Ok(user_id)
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

/// Creates, resolves and destroys sessions.
///
/// Expiry is checked against the injected clock; the cache TTL only bounds
/// how long dead sessions occupy memory.
#[derive(Clone)]
pub struct SessionManager {
    cache: Cache,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(cache: Cache, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache,
            clock,
            ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    pub fn with_ttl_hours(mut self, hours: i64) -> Self {
        self.ttl = Duration::hours(hours);
        self
    }

    fn key(id: &SessionId) -> String {
        cache_key!("session", id)
    }

    fn store(&self, session: &AuthSession) -> Result<(), AuthError> {
        let ttl = self.ttl.to_std().unwrap_or_default();
        self.cache.set_with_ttl(&Self::key(&session.id), session, ttl)?;
        Ok(())
    }

    fn issue(&self, user: Option<&User>) -> Result<AuthSession, AuthError> {
        let now = self.clock.now();
        let session = AuthSession {
            id: SessionId::new(generate_token("sess")),
            user_id: user.map(|u| u.id),
            role: user.map(|u| u.role),
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.store(&session)?;
        Ok(session)
    }

    /// Start an anonymous session.
    pub fn start_guest(&self) -> Result<AuthSession, AuthError> {
        let session = self.issue(None)?;
        debug!(session_id = %session.id, "guest session started");
        Ok(session)
    }

    /// Look up a live session. Expired sessions are removed and reported as
    /// absent.
    pub fn resolve(&self, id: &SessionId) -> Result<Option<AuthSession>, AuthError> {
        let key = Self::key(id);
        match self.cache.get::<AuthSession>(&key)? {
            Some(session) if session.is_expired(self.clock.now()) => {
                self.cache.delete(&key);
                debug!(session_id = %id, "session expired");
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Resolve the presented session or start a guest one.
    ///
    /// The flag is `true` when a new session was created, so the caller knows
    /// to hand the id back to the client.
    pub fn resolve_or_start(
        &self,
        id: Option<&SessionId>,
    ) -> Result<(AuthSession, bool), AuthError> {
        if let Some(id) = id {
            if let Some(session) = self.resolve(id)? {
                return Ok((session, false));
            }
        }
        Ok((self.start_guest()?, true))
    }

    /// Issue a fresh session for `user`, retiring `previous`.
    ///
    /// The id always rotates on sign-in.
    pub fn sign_in(
        &self,
        previous: Option<&SessionId>,
        user: &User,
    ) -> Result<AuthSession, AuthError> {
        if let Some(previous) = previous {
            self.destroy(previous);
        }
        let session = self.issue(Some(user))?;
        info!(user_id = %user.id, session_id = %session.id, "user signed in");
        Ok(session)
    }

    /// Remove a session. Returns whether one existed.
    pub fn destroy(&self, id: &SessionId) -> bool {
        self.cache.delete(&Self::key(id))
    }

    /// Drop sessions whose cache entry has lapsed.
    pub fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use duka_commerce::clock::FixedClock;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap()
    }

    fn manager_at(at: DateTime<Utc>, cache: Cache) -> SessionManager {
        SessionManager::new(cache, Arc::new(FixedClock(at)))
    }

    fn user(role: Role) -> User {
        User {
            id: UserId::generate(),
            email: "asha@example.com".to_string(),
            name: "Asha".to_string(),
            phone: None,
            role,
            password_hash: String::new(),
            created_at: now(),
        }
    }

    #[test]
    fn test_guest_session_owner() {
        let sessions = manager_at(now(), Cache::new());
        let session = sessions.start_guest().unwrap();
        assert!(session.id.as_str().starts_with("sess_"));
        assert!(!session.is_authenticated());
        assert_eq!(session.owner(), CartOwner::Guest(session.id.clone()));
        assert_eq!(session.expires_at, now() + Duration::days(7));
    }

    #[test]
    fn test_resolve_round_trip() {
        let sessions = manager_at(now(), Cache::new());
        let session = sessions.start_guest().unwrap();
        assert_eq!(sessions.resolve(&session.id).unwrap(), Some(session));
        assert_eq!(sessions.resolve(&SessionId::new("sess_unknown")).unwrap(), None);
    }

    #[test]
    fn test_expired_session_is_dropped() {
        let cache = Cache::new();
        let session = manager_at(now(), cache.clone()).start_guest().unwrap();

        let later = manager_at(now() + Duration::days(8), cache.clone());
        assert_eq!(later.resolve(&session.id).unwrap(), None);
        assert!(cache.keys("session:").is_empty());
    }

    #[test]
    fn test_resolve_or_start_reports_creation() {
        let sessions = manager_at(now(), Cache::new());
        let (first, created) = sessions.resolve_or_start(None).unwrap();
        assert!(created);
        let (again, created) = sessions.resolve_or_start(Some(&first.id)).unwrap();
        assert!(!created);
        assert_eq!(again.id, first.id);
    }

    #[test]
    fn test_sign_in_rotates_id() {
        let sessions = manager_at(now(), Cache::new());
        let guest = sessions.start_guest().unwrap();
        let customer = user(Role::Customer);

        let signed_in = sessions.sign_in(Some(&guest.id), &customer).unwrap();
        assert_ne!(signed_in.id, guest.id);
        assert_eq!(signed_in.owner(), CartOwner::User(customer.id));
        assert_eq!(sessions.resolve(&guest.id).unwrap(), None);
    }

    #[test]
    fn test_admin_checks() {
        let sessions = manager_at(now(), Cache::new());
        let guest = sessions.start_guest().unwrap();
        assert!(matches!(guest.require_admin(), Err(AuthError::Unauthenticated)));

        let customer = sessions.sign_in(None, &user(Role::Customer)).unwrap();
        assert!(matches!(customer.require_admin(), Err(AuthError::Forbidden)));

        let admin = sessions.sign_in(None, &user(Role::Admin)).unwrap();
        assert!(admin.require_admin().is_ok());
    }

    #[test]
    fn test_destroy() {
        let sessions = manager_at(now(), Cache::new());
        let session = sessions.start_guest().unwrap();
        assert!(sessions.destroy(&session.id));
        assert!(!sessions.destroy(&session.id));
    }

    #[test]
    fn test_lapsed_guest_sessions_are_reclaimed() {
        let cache = Cache::new();
        let manager = manager_at(now(), cache.clone()).with_ttl_hours(0);
        for _ in 0..1000 {
            manager.start_guest().unwrap();
        }
        assert!(cache.stored() <= duka_cache::SWEEP_EVERY);
        manager.purge_expired();
        assert_eq!(cache.stored(), 0);
    }
}
