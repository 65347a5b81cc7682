//! Accounts: register, login, logout, me.

use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::extract::ApiJson;
use crate::middleware::{attach_session, clear_session};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Router};
use duka_auth::{AuthError, AuthSession, Credentials, Registration, UserProfile};
use duka_commerce::cart::CartOwner;
use duka_commerce::ids::SessionId;
use duka_mail::{dispatch, templates};
use serde::Serialize;
use tracing::warn;

/// A signed-in account and the session id to present from now on.
#[derive(Debug, Serialize)]
pub struct SignedIn {
    pub user: UserProfile,
    pub session_id: SessionId,
}

#[derive(Debug, Serialize)]
struct SignedOut {
    signed_out: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

/// Carry the guest's cart over to the account. A failed merge leaves the
/// guest cart where it was and does not block sign-in.
async fn merge_guest_cart(state: &AppState, previous: &AuthSession, signed_in: &AuthSession) {
    let guest = previous.owner();
    if !guest.is_guest() {
        return;
    }
    let user: CartOwner = signed_in.owner();
    if let Err(e) = state.carts.merge(&guest, &user).await {
        warn!(error = %e, "could not merge guest cart");
    }
}

fn signed_in_response(state: &AppState, status: StatusCode, body: SignedIn) -> Response {
    let session_id = body.session_id.clone();
    let mut response = (status, ApiResponse::new(body)).into_response();
    attach_session(&mut response, &session_id, &state.http);
    response
}

async fn register(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    ApiJson(form): ApiJson<Registration>,
) -> Result<Response, ApiError> {
    let (user, signed_in) = state.auth.register(form, Some(&session.id)).await?;
    merge_guest_cart(&state, &session, &signed_in).await;

    let store_name = state.store_name().await;
    dispatch(
        state.mailer.as_ref(),
        Some(templates::welcome(&store_name, &user.name, &user.email)),
    )
    .await;

    let body = SignedIn {
        user: user.profile(),
        session_id: signed_in.id,
    };
    Ok(signed_in_response(&state, StatusCode::CREATED, body))
}

async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Response, ApiError> {
    let (user, signed_in) = state.auth.login(credentials, Some(&session.id)).await?;
    merge_guest_cart(&state, &session, &signed_in).await;
    let body = SignedIn {
        user: user.profile(),
        session_id: signed_in.id,
    };
    Ok(signed_in_response(&state, StatusCode::OK, body))
}

async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> Response {
    state.auth.logout(&session.id);
    let mut response = ApiResponse::new(SignedOut { signed_out: true }).into_response();
    clear_session(&mut response, &state.http);
    response
}

async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> ApiResult<UserProfile> {
    session.require_user()?;
    let user = state
        .auth
        .current_user(&session)
        .await?
        .ok_or(AuthError::Unauthenticated)?;
    Ok(ApiResponse::new(user.profile()))
}
