//! API error type and the JSON envelopes.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use duka_auth::AuthError;
use duka_commerce::error::CommerceError;
use duka_commerce::validation::FieldErrors;
use duka_invoice::InvoiceError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

const INTERNAL_MESSAGE: &str = "Something went wrong. Please try again.";

/// Success body: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self { data })
    }
}

/// Handler result for plain `200 OK` responses.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Error body: `{"error": {"code", "message", "fields"}}`.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    pub fields: FieldErrors,
}

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Invoice(#[from] InvoiceError),

    /// Malformed body, query or path.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String, FieldErrors) {
        match self {
            ApiError::Commerce(e) => commerce_parts(e),
            ApiError::Auth(e) => auth_parts(e),
            ApiError::Invoice(InvoiceError::Commerce(e)) if e.is_not_found() => {
                (StatusCode::NOT_FOUND, "not_found", e.to_string(), FieldErrors::new())
            }
            ApiError::Invoice(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "invoice_failed",
                "Could not generate the invoice".to_string(),
                FieldErrors::new(),
            ),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                message.clone(),
                FieldErrors::new(),
            ),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                "not_found",
                message.clone(),
                FieldErrors::new(),
            ),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.parts().0
    }
}

fn internal() -> (StatusCode, &'static str, String, FieldErrors) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        INTERNAL_MESSAGE.to_string(),
        FieldErrors::new(),
    )
}

fn commerce_parts(e: &CommerceError) -> (StatusCode, &'static str, String, FieldErrors) {
    let plain = |status, code| (status, code, e.to_string(), FieldErrors::new());
    match e {
        CommerceError::Validation(fields) => (
            StatusCode::BAD_REQUEST,
            "validation_error",
            "Please correct the highlighted fields".to_string(),
            fields.clone(),
        ),
        e if e.is_not_found() => plain(StatusCode::NOT_FOUND, "not_found"),
        CommerceError::Conflict(_) => plain(StatusCode::CONFLICT, "conflict"),
        CommerceError::InvalidStatusTransition { .. } => {
            plain(StatusCode::CONFLICT, "invalid_transition")
        }
        CommerceError::Forbidden(_) => plain(StatusCode::FORBIDDEN, "forbidden"),
        CommerceError::ProductUnavailable(_)
        | CommerceError::InsufficientStock { .. }
        | CommerceError::InvalidQuantity(_)
        | CommerceError::QuantityExceedsLimit(..)
        | CommerceError::EmptyCart
        | CommerceError::InvalidCheckoutTransition { .. }
        | CommerceError::CurrencyMismatch { .. } => plain(StatusCode::BAD_REQUEST, "bad_request"),
        _ => internal(),
    }
}

fn auth_parts(e: &AuthError) -> (StatusCode, &'static str, String, FieldErrors) {
    match e {
        AuthError::Validation(fields) => (
            StatusCode::BAD_REQUEST,
            "validation_error",
            "Please correct the highlighted fields".to_string(),
            fields.clone(),
        ),
        e if e.is_auth_failure() => (
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            e.to_string(),
            FieldErrors::new(),
        ),
        e if e.is_permission_error() => (
            StatusCode::FORBIDDEN,
            "forbidden",
            e.to_string(),
            FieldErrors::new(),
        ),
        AuthError::EmailTaken(_) => {
            let mut fields = FieldErrors::new();
            fields.add("email", "An account with this email already exists");
            (
                StatusCode::CONFLICT,
                "conflict",
                "Email already registered".to_string(),
                fields,
            )
        }
        _ => internal(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = self.parts();
        if status.is_server_error() {
            error!(error = %self, code, "request failed");
        }
        let body = ErrorEnvelope {
            error: ErrorBody {
                code,
                message,
                fields,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::NotFound(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    async fn body_of(err: ApiError) -> serde_json::Value {
        let bytes = err
            .into_response()
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_commerce_statuses() {
        assert_eq!(
            status_of(CommerceError::invalid("phone", "required")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CommerceError::ProductNotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CommerceError::Conflict("slug".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CommerceError::Forbidden("x".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(CommerceError::EmptyCart), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(CommerceError::Storage("db down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_statuses() {
        assert_eq!(status_of(AuthError::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(AuthError::EmailTaken("a@b.co".into())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_invoice_failures_are_generic() {
        assert_eq!(
            status_of(InvoiceError::Upload {
                key: "invoices/x.pdf".into(),
                reason: "boom".into()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(InvoiceError::Commerce(CommerceError::OrderNotFound("x".into()))),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_validation_envelope_carries_fields() {
        let body = body_of(CommerceError::invalid("region", "Region is required").into()).await;
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["fields"]["region"], "Region is required");
    }

    #[tokio::test]
    async fn test_internal_message_hides_details() {
        let body = body_of(CommerceError::Storage("password=hunter2".into()).into()).await;
        assert_eq!(body["error"]["code"], "internal_error");
        assert_eq!(body["error"]["message"], INTERNAL_MESSAGE);
        assert!(body["error"].get("fields").is_none());
    }
}
