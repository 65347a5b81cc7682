//! Public, admin-edited content.

use crate::error::{ApiResponse, ApiResult};
use crate::state::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::Router;
use duka_commerce::content::{ContactInfo, FaqEntry, SiteSettings};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/content/contact", get(contact))
        .route("/content/faq", get(faq))
        .route("/content/settings", get(settings))
}

async fn contact(State(state): State<AppState>) -> ApiResult<ContactInfo> {
    Ok(ApiResponse::new(state.content.contact_info().await?))
}

/// Published entries only.
async fn faq(State(state): State<AppState>) -> ApiResult<Vec<FaqEntry>> {
    Ok(ApiResponse::new(state.content.faqs().await?))
}

async fn settings(State(state): State<AppState>) -> ApiResult<SiteSettings> {
    Ok(ApiResponse::new(state.content.settings().await?))
}
