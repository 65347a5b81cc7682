//! Liveness.

use crate::error::ApiResponse;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize, PartialEq, Eq)]
struct Health {
    status: &'static str,
    database: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let Some(db) = &state.db else {
        return (
            StatusCode::OK,
            ApiResponse::new(Health {
                status: "ok",
                database: "not_configured",
            }),
        );
    };
    match db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            ApiResponse::new(Health {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiResponse::new(Health {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}
