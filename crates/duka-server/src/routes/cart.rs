//! The current owner's cart. Every mutation answers with the full cart.

use crate::error::{ApiResponse, ApiResult};
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;
use axum::extract::State;
use axum::routing::{get, patch, post};
use axum::{Extension, Router};
use duka_commerce::cart::{AddToCart, Cart, CartOwner, CartView, UpdateQuantity};
use duka_commerce::ids::CartItemId;
use tracing::instrument;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_item))
        .route("/cart/items/{id}", patch(update_item).delete(remove_item))
}

pub(crate) fn view(cart: Cart) -> ApiResult<CartView> {
    Ok(ApiResponse::new(CartView::try_from(cart)?))
}

async fn get_cart(
    State(state): State<AppState>,
    Extension(owner): Extension<CartOwner>,
) -> ApiResult<CartView> {
    view(state.carts.get(&owner).await?)
}

#[instrument(skip(state, owner), fields(owner = %owner, product_id = %request.product_id))]
async fn add_item(
    State(state): State<AppState>,
    Extension(owner): Extension<CartOwner>,
    ApiJson(request): ApiJson<AddToCart>,
) -> ApiResult<CartView> {
    view(state.carts.add(&owner, request).await?)
}

#[instrument(skip(state, owner), fields(owner = %owner))]
async fn update_item(
    State(state): State<AppState>,
    Extension(owner): Extension<CartOwner>,
    ApiPath(id): ApiPath<CartItemId>,
    ApiJson(body): ApiJson<UpdateQuantity>,
) -> ApiResult<CartView> {
    view(state.carts.update_quantity(&owner, id, body.quantity).await?)
}

async fn remove_item(
    State(state): State<AppState>,
    Extension(owner): Extension<CartOwner>,
    ApiPath(id): ApiPath<CartItemId>,
) -> ApiResult<CartView> {
    view(state.carts.remove(&owner, id).await?)
}

async fn clear_cart(
    State(state): State<AppState>,
    Extension(owner): Extension<CartOwner>,
) -> ApiResult<CartView> {
    view(state.carts.clear(&owner).await?)
}
