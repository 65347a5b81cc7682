//! The current owner's wishlist.

use crate::error::{ApiResponse, ApiResult};
use crate::extract::{ApiJson, ApiPath};
use crate::routes::cart::view;
use crate::state::AppState;
use axum::extract::State;
use axum::routing::{delete, get, post};
use axum::{Extension, Router};
use duka_commerce::cart::{CartOwner, CartView};
use duka_commerce::ids::ProductId;
use duka_commerce::wishlist::{AddToWishlist, WishlistItem};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/wishlist", get(list).post(add))
        .route("/wishlist/{product_id}", delete(remove))
        .route("/wishlist/{product_id}/move-to-cart", post(move_to_cart))
}

async fn list(
    State(state): State<AppState>,
    Extension(owner): Extension<CartOwner>,
) -> ApiResult<Vec<WishlistItem>> {
    Ok(ApiResponse::new(state.wishlists.list(&owner).await?))
}

async fn add(
    State(state): State<AppState>,
    Extension(owner): Extension<CartOwner>,
    ApiJson(body): ApiJson<AddToWishlist>,
) -> ApiResult<Vec<WishlistItem>> {
    Ok(ApiResponse::new(state.wishlists.add(&owner, body.product_id).await?))
}

async fn remove(
    State(state): State<AppState>,
    Extension(owner): Extension<CartOwner>,
    ApiPath(product_id): ApiPath<ProductId>,
) -> ApiResult<Vec<WishlistItem>> {
    Ok(ApiResponse::new(state.wishlists.remove(&owner, product_id).await?))
}

async fn move_to_cart(
    State(state): State<AppState>,
    Extension(owner): Extension<CartOwner>,
    ApiPath(product_id): ApiPath<ProductId>,
) -> ApiResult<CartView> {
    view(state.wishlists.move_to_cart(&owner, product_id).await?)
}
