//! Support tickets.

use crate::error::{ApiError, ApiResponse};
use crate::extract::ApiJson;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use duka_commerce::content::SupportTicket;
use duka_commerce::error::CommerceError;
use duka_mail::{dispatch, templates};
use serde::Serialize;
use tracing::{info, instrument};

#[derive(Debug, Serialize)]
pub struct TicketReceipt {
    pub reference: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/support", post(open_ticket))
}

/// Accept a ticket and acknowledge it by mail. Tickets are not stored; the
/// acknowledgment and the log line carry the reference.
#[instrument(skip(state, ticket))]
async fn open_ticket(
    State(state): State<AppState>,
    ApiJson(ticket): ApiJson<SupportTicket>,
) -> Result<(StatusCode, Json<ApiResponse<TicketReceipt>>), ApiError> {
    ticket.validate().map_err(CommerceError::from)?;
    let reference = SupportTicket::generate_reference();
    info!(reference = %reference, subject = %ticket.subject, "support ticket received");

    let store_name = state.store_name().await;
    dispatch(
        state.mailer.as_ref(),
        Some(templates::support_ack(&store_name, &ticket, &reference)),
    )
    .await;

    Ok((StatusCode::ACCEPTED, ApiResponse::new(TicketReceipt { reference })))
}
