//! HTTP API for the Duka storefront.
//!
//! An axum application over the domain services. Handlers receive the
//! request's [`CartOwner`](duka_commerce::cart::CartOwner) and
//! [`AuthSession`](duka_auth::AuthSession) as extensions, resolved once by
//! the session middleware. Success bodies are `{"data": ...}` and failures
//! `{"error": {"code", "message", "fields"}}`.

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::{ConfigError, DukaConfig, LogFormat};
pub use error::{ApiError, ApiResponse};
pub use routes::build_app;
pub use state::{AppState, Backends, HttpSettings};
