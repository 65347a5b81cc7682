//! Order placement, order detail and invoices.

use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use duka_auth::AuthSession;
use duka_commerce::cart::CartOwner;
use duka_commerce::checkout::{CreateOrder, Order, OrderConfirmation};
use duka_commerce::ids::OrderId;
use duka_invoice::GeneratedInvoice;
use duka_mail::{dispatch, templates};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Result of an invoice generation.
#[derive(Debug, Serialize)]
pub struct InvoiceView {
    pub order_number: String,
    pub invoice_url: String,
    pub verification_code: String,
    pub pages: usize,
}

impl From<&GeneratedInvoice> for InvoiceView {
    fn from(invoice: &GeneratedInvoice) -> Self {
        Self {
            order_number: invoice.order.order_number.clone(),
            invoice_url: invoice.url.clone(),
            verification_code: invoice.verification_code.clone(),
            pages: invoice.pages,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/invoice", post(generate_invoice))
}

/// Place the order, then mail the confirmation and try to produce the
/// invoice. Neither follow-up can fail the request.
#[instrument(skip(state, owner, request), fields(owner = %owner))]
async fn create_order(
    State(state): State<AppState>,
    Extension(owner): Extension<CartOwner>,
    ApiJson(request): ApiJson<CreateOrder>,
) -> Result<(StatusCode, Json<ApiResponse<OrderConfirmation>>), ApiError> {
    let order = state.orders.place(&owner, request).await?;
    let store_name = state.store_name().await;
    dispatch(
        state.mailer.as_ref(),
        templates::order_confirmation(&store_name, &order),
    )
    .await;

    match state.invoices.generate(order.id).await {
        Ok(invoice) => {
            dispatch(
                state.mailer.as_ref(),
                templates::invoice_ready(&store_name, &invoice.order),
            )
            .await;
        }
        Err(e) => warn!(
            order_number = %order.order_number,
            error = %e,
            "invoice generation failed, order kept"
        ),
    }

    Ok((StatusCode::CREATED, ApiResponse::new(OrderConfirmation::from(&order))))
}

/// Admins see every order; everyone else only their own.
async fn visible_order(
    state: &AppState,
    session: &AuthSession,
    owner: &CartOwner,
    id: OrderId,
) -> Result<Order, ApiError> {
    if session.is_admin() {
        Ok(state.orders.get(id).await?)
    } else {
        Ok(state.orders.get_for(owner, id).await?)
    }
}

async fn get_order(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Extension(owner): Extension<CartOwner>,
    ApiPath(id): ApiPath<OrderId>,
) -> ApiResult<Order> {
    Ok(ApiResponse::new(visible_order(&state, &session, &owner, id).await?))
}

#[instrument(skip(state, session, owner), fields(order_id = %id))]
async fn generate_invoice(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Extension(owner): Extension<CartOwner>,
    ApiPath(id): ApiPath<OrderId>,
) -> ApiResult<InvoiceView> {
    visible_order(&state, &session, &owner, id).await?;
    let invoice = state.invoices.generate(id).await?;
    info!(url = %invoice.url, pages = invoice.pages, "invoice regenerated");
    let store_name = state.store_name().await;
    dispatch(
        state.mailer.as_ref(),
        templates::invoice_ready(&store_name, &invoice.order),
    )
    .await;
    Ok(ApiResponse::new(InvoiceView::from(&invoice)))
}
