//! Who a cart (or wishlist, or order) belongs to.

use crate::ids::{SessionId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The owner of a cart: a signed-in user or an anonymous session.
///
/// Resolved once per request and passed explicitly to every cart operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CartOwner {
    User(UserId),
    Guest(SessionId),
}

impl CartOwner {
    pub fn user(&self) -> Option<UserId> {
        match self {
            CartOwner::User(id) => Some(*id),
            CartOwner::Guest(_) => None,
        }
    }

    pub fn session(&self) -> Option<&SessionId> {
        match self {
            CartOwner::User(_) => None,
            CartOwner::Guest(id) => Some(id),
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, CartOwner::Guest(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CartOwner::User(_) => "user",
            CartOwner::Guest(_) => "guest",
        }
    }

    /// The raw key stored alongside the kind.
    pub fn key(&self) -> String {
        match self {
            CartOwner::User(id) => id.to_string(),
            CartOwner::Guest(id) => id.to_string(),
        }
    }

    /// Rebuild from a stored `(kind, key)` pair.
    pub fn from_parts(kind: &str, key: &str) -> Option<Self> {
        match kind {
            "user" => key.parse().ok().map(CartOwner::User),
            "guest" => Some(CartOwner::Guest(SessionId::new(key))),
            _ => None,
        }
    }
}

impl fmt::Display for CartOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts_roundtrip() {
        let user = CartOwner::User(UserId::generate());
        let back = CartOwner::from_parts(user.kind(), &user.key()).unwrap();
        assert_eq!(back, user);

        let guest = CartOwner::Guest(SessionId::new("abc"));
        assert_eq!(CartOwner::from_parts("guest", "abc"), Some(guest));
        assert_eq!(CartOwner::from_parts("robot", "abc"), None);
        assert_eq!(CartOwner::from_parts("user", "not-a-uuid"), None);
    }

    #[test]
    fn test_serde_shape() {
        let guest = CartOwner::Guest(SessionId::new("s-1"));
        let json = serde_json::to_value(&guest).unwrap();
        assert_eq!(json["kind"], "guest");
        assert_eq!(json["id"], "s-1");
    }
}
