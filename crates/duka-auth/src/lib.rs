//! Accounts and sessions for Duka.
//!
//! Provides password hashing, cache-backed sessions, the account store seam
//! and the register/login/logout flows. Role checks for admin routes live on
//! [`AuthSession`].

mod error;
mod password;
mod repository;
mod service;
mod session;
mod user;

pub use error::AuthError;
pub use password::{PasswordHasher, MIN_PASSWORD_LEN};
pub use repository::UserRepository;
pub use service::AuthService;
pub use session::{AuthSession, SessionManager, DEFAULT_SESSION_TTL_HOURS};
pub use user::{normalize_email, Credentials, Registration, Role, User, UserProfile};
