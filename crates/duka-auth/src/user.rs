//! User types.

use crate::password::PasswordHasher;
use chrono::{DateTime, Utc};
use duka_commerce::ids::UserId;
use duka_commerce::validation::{is_valid_email, is_valid_phone, FieldErrors};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular customer.
    #[default]
    Customer,
    /// Store administrator.
    Admin,
}

impl Role {
    /// Get role as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }

    /// Check if this role has at least the given permission level.
    pub fn has_permission(&self, required: Role) -> bool {
        self.level() >= required.level()
    }

    fn level(&self) -> u8 {
        match self {
            Role::Customer => 0,
            Role::Admin => 1,
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A registered account.
///
/// The password hash never leaves the server: it is skipped when
/// serializing so a `User` can't leak it through a response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: Role,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.has_permission(Role::Admin)
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

/// Public view of a user, returned by `/api/auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: Role,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            phone: user.phone.clone(),
            role: user.role,
        }
    }
}

/// Lowercase and trim an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Account registration form.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Registration {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(!is_valid_email(&self.email), "email", "Enter a valid email address");
        errors.extend(PasswordHasher::validate_password(&self.password));
        errors.check(self.name.trim().is_empty(), "name", "Name is required");
        if let Some(phone) = self.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            errors.check(!is_valid_phone(phone), "phone", "Enter a valid phone number");
        }
        errors.into_result()
    }

    /// Build the account record from a validated form.
    pub fn into_user(self, password_hash: String, role: Role, now: DateTime<Utc>) -> User {
        User {
            id: UserId::generate(),
            email: normalize_email(&self.email),
            name: self.name.trim().to_string(),
            phone: self
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            role,
            password_hash,
            created_at: now,
        }
    }
}

/// Login form.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(self.email.trim().is_empty(), "email", "Email is required");
        errors.check(self.password.is_empty(), "password", "Password is required");
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> Registration {
        Registration {
            email: " Asha@Example.com ".to_string(),
            password: "karibu2024".to_string(),
            name: "Asha Mwinyi".to_string(),
            phone: Some("+255 712 345 678".to_string()),
        }
    }

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.has_permission(Role::Customer));
        assert!(Role::Admin.has_permission(Role::Admin));
        assert!(!Role::Customer.has_permission(Role::Admin));
    }

    #[test]
    fn test_role_round_trip_str() {
        for role in [Role::Customer, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_registration_valid() {
        assert!(registration().validate().is_ok());
    }

    #[test]
    fn test_registration_collects_field_errors() {
        let form = Registration {
            email: "nope".to_string(),
            password: "short".to_string(),
            name: " ".to_string(),
            phone: Some("12".to_string()),
        };
        let errors = form.validate().unwrap_err();
        for field in ["email", "password", "name", "phone"] {
            assert!(errors.contains(field), "missing {field}");
        }
    }

    #[test]
    fn test_into_user_normalizes() {
        let user = registration().into_user("hash".to_string(), Role::Customer, Utc::now());
        assert_eq!(user.email, "asha@example.com");
        assert_eq!(user.phone.as_deref(), Some("+255 712 345 678"));
        assert!(!user.is_admin());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = registration().into_user("secret-hash".to_string(), Role::Admin, Utc::now());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains(r#""role":"admin""#));
    }
}
