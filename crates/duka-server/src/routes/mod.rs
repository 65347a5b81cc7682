//! HTTP routes and the application router.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod content;
pub mod health;
pub mod orders;
pub mod support;
pub mod wishlist;

use crate::middleware::{request_id, resolve_session, REQUEST_ID_HEADER, SESSION_HEADER};
use crate::state::AppState;
use axum::extract::Request;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info_span;

/// Build the full application: public and admin API under `/api`, health at
/// the root, wrapped in session, tracing, CORS and request-id layers.
pub fn build_app(state: AppState) -> Router {
    let api = Router::new()
        .merge(catalog::router())
        .merge(cart::router())
        .merge(wishlist::router())
        .merge(checkout::router())
        .merge(orders::router())
        .merge(auth::router())
        .merge(content::router())
        .merge(support::router())
        .nest("/admin", admin::router())
        .layer(from_fn_with_state(state.clone(), resolve_session));

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    Router::new()
        .merge(health::router())
        .nest("/api", api)
        .layer(trace)
        .layer(cors(&state.http.cors_origins))
        .layer(from_fn(request_id))
        .with_state(state)
}

fn cors(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderName::from_static(SESSION_HEADER),
        ])
        .expose_headers([
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderName::from_static(SESSION_HEADER),
        ]);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    layer
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
}
