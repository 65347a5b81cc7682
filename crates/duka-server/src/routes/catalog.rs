//! Public catalog: listing, detail, categories and reviews.

use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use duka_auth::AuthSession;
use duka_commerce::catalog::{Category, NewReview, Page, Product, ProductDetail, ProductQuery, Review};
use tracing::instrument;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/{slug}", get(product_detail))
        .route("/products/{slug}/reviews", post(add_review))
        .route("/categories", get(list_categories))
}

#[instrument(skip(state))]
async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<Page<Product>> {
    Ok(ApiResponse::new(state.catalog.list(query).await?))
}

async fn product_detail(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<ProductDetail> {
    Ok(ApiResponse::new(state.catalog.detail(&slug).await?))
}

async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::new(state.catalog.categories().await?))
}

/// Guests must give a name; signed-in customers default to their account
/// name.
#[instrument(skip(state, session, review), fields(slug = %slug))]
async fn add_review(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    ApiPath(slug): ApiPath<String>,
    ApiJson(mut review): ApiJson<NewReview>,
) -> Result<(StatusCode, Json<ApiResponse<Review>>), ApiError> {
    let unnamed = review
        .author_name
        .as_deref()
        .map_or(true, |n| n.trim().is_empty());
    if unnamed {
        if let Some(user) = state.auth.current_user(&session).await? {
            review.author_name = Some(user.name);
        }
    }
    let review = state.catalog.add_review(&slug, review).await?;
    Ok((StatusCode::CREATED, ApiResponse::new(review)))
}
