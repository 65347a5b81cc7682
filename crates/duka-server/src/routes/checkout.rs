//! Checkout pricing.

use crate::error::{ApiResponse, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;
use axum::extract::State;
use axum::routing::post;
use axum::{Extension, Router};
use duka_commerce::cart::CartOwner;
use duka_commerce::checkout::{PriceBreakdown, QuoteRequest};

pub fn router() -> Router<AppState> {
    Router::new().route("/checkout/quote", post(quote))
}

/// Price the session's cart for delivery to a region.
async fn quote(
    State(state): State<AppState>,
    Extension(owner): Extension<CartOwner>,
    ApiJson(request): ApiJson<QuoteRequest>,
) -> ApiResult<PriceBreakdown> {
    Ok(ApiResponse::new(state.orders.quote(&owner, &request.region).await?))
}
