//! Register, login and logout against the in-memory account store.

use duka_auth::{AuthError, AuthService, Credentials, Registration, Role, SessionManager};
use duka_cache::Cache;
use duka_commerce::cart::CartOwner;
use duka_test_support::{FixedClock, InMemoryUsers, fixed_now};
use std::sync::Arc;

fn service() -> (AuthService, Arc<InMemoryUsers>) {
    let users = Arc::new(InMemoryUsers::new());
    let clock = Arc::new(FixedClock(fixed_now()));
    let sessions = SessionManager::new(Cache::new(), clock.clone());
    (AuthService::new(users.clone(), sessions, clock), users)
}

fn registration(email: &str) -> Registration {
    Registration {
        email: email.to_string(),
        password: "karibu2024".to_string(),
        name: "Asha Mwinyi".to_string(),
        phone: None,
    }
}

#[tokio::test]
async fn test_register_signs_in_and_rotates_guest_session() {
    let (auth, users) = service();
    let guest = auth.sessions().start_guest().unwrap();

    let (user, session) = auth
        .register(registration("asha@example.com"), Some(&guest.id))
        .await
        .unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(user.role, Role::Customer);
    assert_eq!(session.owner(), CartOwner::User(user.id));
    assert_ne!(session.id, guest.id);
    assert!(auth.sessions().resolve(&guest.id).unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_email_is_rejected_case_insensitively() {
    let (auth, _) = service();
    auth.register(registration("asha@example.com"), None).await.unwrap();

    let err = auth
        .register(registration("ASHA@example.com"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::EmailTaken(_)));
}

#[tokio::test]
async fn test_weak_password_is_a_field_error() {
    let (auth, users) = service();
    let mut form = registration("asha@example.com");
    form.password = "password".to_string();

    match auth.register(form, None).await.unwrap_err() {
        AuthError::Validation(fields) => assert!(fields.contains("password")),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(users.is_empty());
}

#[tokio::test]
async fn test_login_checks_password() {
    let (auth, _) = service();
    auth.register(registration("asha@example.com"), None).await.unwrap();

    let ok = auth
        .login(
            Credentials {
                email: "Asha@Example.com".to_string(),
                password: "karibu2024".to_string(),
            },
            None,
        )
        .await;
    assert!(ok.is_ok());

    let wrong = auth
        .login(
            Credentials {
                email: "asha@example.com".to_string(),
                password: "karibu2025".to_string(),
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(wrong.is_auth_failure());

    let unknown = auth
        .login(
            Credentials {
                email: "juma@example.com".to_string(),
                password: "karibu2024".to_string(),
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(unknown, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_logout_and_current_user() {
    let (auth, _) = service();
    let (user, session) = auth.register(registration("asha@example.com"), None).await.unwrap();

    let current = auth.current_user(&session).await.unwrap().unwrap();
    assert_eq!(current.id, user.id);

    auth.logout(&session.id);
    assert!(auth.sessions().resolve(&session.id).unwrap().is_none());
}

#[tokio::test]
async fn test_create_admin() {
    let (auth, _) = service();
    let admin = auth
        .create_user(registration("admin@duka.co.tz"), Role::Admin)
        .await
        .unwrap();
    assert!(admin.is_admin());

    let (_, session) = auth
        .login(
            Credentials {
                email: "admin@duka.co.tz".to_string(),
                password: "karibu2024".to_string(),
            },
            None,
        )
        .await
        .unwrap();
    assert!(session.require_admin().is_ok());
}
