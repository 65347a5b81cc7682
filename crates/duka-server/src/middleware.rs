//! Request id, session resolution and the admin guard.

use crate::error::ApiError;
use crate::state::{AppState, HttpSettings};
use axum::extract::{Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use duka_auth::AuthSession;
use duka_commerce::ids::SessionId;
use tracing::warn;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const SESSION_HEADER: &str = "x-session-id";

/// Request id, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Use the caller's `x-request-id` or generate one, and echo it back.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    // Also written back to the request so the trace span can pick it up.
    if let Ok(value) = HeaderValue::from_str(&id) {
        req.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

/// The session id a request presents: `x-session-id` header first, then the
/// session cookie.
pub fn presented_session(headers: &HeaderMap, cookie_name: &str) -> Option<SessionId> {
    let from_header = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from);
    let from_cookie = || {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == cookie_name)
            .map(|(_, value)| value.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    from_header.or_else(from_cookie).map(SessionId::new)
}

/// Resolve (or start) the session and put it, with its cart owner, into the
/// request extensions. New sessions are returned to the client.
pub async fn resolve_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let presented = presented_session(req.headers(), &state.http.cookie_name);
    let (session, created) = match state.auth.sessions().resolve_or_start(presented.as_ref()) {
        Ok(resolved) => resolved,
        Err(e) => return ApiError::from(e).into_response(),
    };
    let session_id = session.id.clone();
    req.extensions_mut().insert(session.owner());
    req.extensions_mut().insert(session);

    let mut response = next.run(req).await;
    if created && !response.headers().contains_key(SESSION_HEADER) {
        attach_session(&mut response, &session_id, &state.http);
    }
    response
}

/// Hand a session id to the client as header and cookie.
pub fn attach_session(response: &mut Response, id: &SessionId, http: &HttpSettings) {
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        http.cookie_name, id, http.session_max_age_secs
    );
    match (HeaderValue::from_str(id.as_str()), HeaderValue::from_str(&cookie)) {
        (Ok(header), Ok(cookie)) => {
            response.headers_mut().insert(SESSION_HEADER, header);
            response.headers_mut().append(SET_COOKIE, cookie);
        }
        _ => warn!("session id is not a valid header value"),
    }
}

/// Expire the session cookie.
pub fn clear_session(response: &mut Response, http: &HttpSettings) {
    let cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", http.cookie_name);
    if let Ok(cookie) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
}

/// Reject everyone but signed-in admins.
pub async fn require_admin(
    Extension(session): Extension<AuthSession>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    session.require_admin()?;
    Ok(next.run(req).await)
}
