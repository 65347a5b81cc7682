//! Back office. Every route here requires an admin session.

use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::require_admin;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use duka_commerce::catalog::{
    Category, Page, Product, ProductImage, ProductInput, ProductPatch, ProductQuery,
    DEFAULT_PER_PAGE,
};
use duka_commerce::checkout::{Order, OrderStatusUpdate};
use duka_commerce::content::{ContactInfo, FaqEntry, FaqInput, SiteSettings};
use duka_commerce::ids::{FaqId, OrderId, ProductId};
use duka_mail::{dispatch, templates};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PageParams {
    pub page: i64,
    pub per_page: i64,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
struct Deleted {
    deleted: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/products/{id}/images", put(set_images))
        .route("/categories", post(create_category))
        .route("/content/contact", get(get_contact).put(put_contact))
        .route("/content/faq", get(list_faqs).post(create_faq))
        .route("/content/faq/{id}", put(update_faq).delete(delete_faq))
        .route("/content/settings", get(get_settings).put(put_settings))
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", patch(update_order_status))
        .route_layer(from_fn(require_admin))
}

// Products

/// Includes drafts and archived products.
async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<Page<Product>> {
    Ok(ApiResponse::new(state.catalog.list_all(query).await?))
}

async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> ApiResult<Product> {
    Ok(ApiResponse::new(state.catalog.get(id).await?))
}

#[instrument(skip(state, input), fields(name = %input.name))]
async fn create_product(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Created<Product> {
    let product = state.catalog.create_product(input).await?;
    Ok((StatusCode::CREATED, ApiResponse::new(product)))
}

async fn update_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> ApiResult<Product> {
    Ok(ApiResponse::new(state.catalog.update_product(id, patch).await?))
}

async fn delete_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> ApiResult<Deleted> {
    state.catalog.delete_product(id).await?;
    Ok(ApiResponse::new(Deleted { deleted: true }))
}

async fn set_images(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(images): ApiJson<Vec<ProductImage>>,
) -> ApiResult<Product> {
    Ok(ApiResponse::new(state.catalog.set_images(id, images).await?))
}

async fn create_category(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewCategory>,
) -> Created<Category> {
    let mut category = Category::new(input.name);
    if let Some(description) = input.description.filter(|d| !d.trim().is_empty()) {
        category = category.with_description(description);
    }
    let category = state.catalog.create_category(category).await?;
    Ok((StatusCode::CREATED, ApiResponse::new(category)))
}

// Content

async fn get_contact(State(state): State<AppState>) -> ApiResult<ContactInfo> {
    Ok(ApiResponse::new(state.content.contact_info().await?))
}

async fn put_contact(
    State(state): State<AppState>,
    ApiJson(info): ApiJson<ContactInfo>,
) -> ApiResult<ContactInfo> {
    Ok(ApiResponse::new(state.content.put_contact_info(info).await?))
}

/// Published and unpublished entries.
async fn list_faqs(State(state): State<AppState>) -> ApiResult<Vec<FaqEntry>> {
    Ok(ApiResponse::new(state.content.all_faqs().await?))
}

async fn create_faq(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<FaqInput>,
) -> Created<FaqEntry> {
    let entry = state.content.create_faq(input).await?;
    Ok((StatusCode::CREATED, ApiResponse::new(entry)))
}

async fn update_faq(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<FaqId>,
    ApiJson(input): ApiJson<FaqInput>,
) -> ApiResult<FaqEntry> {
    Ok(ApiResponse::new(state.content.update_faq(id, input).await?))
}

async fn delete_faq(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<FaqId>,
) -> ApiResult<Deleted> {
    state.content.delete_faq(id).await?;
    Ok(ApiResponse::new(Deleted { deleted: true }))
}

async fn get_settings(State(state): State<AppState>) -> ApiResult<SiteSettings> {
    Ok(ApiResponse::new(state.content.settings().await?))
}

async fn put_settings(
    State(state): State<AppState>,
    ApiJson(settings): ApiJson<SiteSettings>,
) -> ApiResult<SiteSettings> {
    Ok(ApiResponse::new(state.content.put_settings(settings).await?))
}

// Orders

async fn list_orders(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Page<Order>> {
    Ok(ApiResponse::new(
        state.orders.list(params.page, params.per_page).await?,
    ))
}

async fn get_order(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
) -> ApiResult<Order> {
    Ok(ApiResponse::new(state.orders.get(id).await?))
}

/// Apply a status change and tell the customer when the fulfilment status
/// moved.
#[instrument(skip(state, update), fields(order_id = %id))]
async fn update_order_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(update): ApiJson<OrderStatusUpdate>,
) -> ApiResult<Order> {
    let order = state.orders.update_status(id, update).await?;
    if update.status.is_some() {
        let store_name = state.store_name().await;
        let sent = dispatch(
            state.mailer.as_ref(),
            templates::order_update(&store_name, &order),
        )
        .await;
        info!(sent, status = order.status.as_str(), "customer notified");
    }
    Ok(ApiResponse::new(order))
}
