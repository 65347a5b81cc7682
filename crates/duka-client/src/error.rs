//! Client error types.

use duka_commerce::error::CommerceError;
use duka_commerce::validation::FieldErrors;
use thiserror::Error;

/// Errors from talking to the storefront API.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Failed to send the request or read the response.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error envelope.
    #[error("HTTP {status} {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        fields: FieldErrors,
    },

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The response body was not the expected JSON.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// A local rule rejected the operation before any request was sent.
    #[error(transparent)]
    Commerce(#[from] CommerceError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Field messages attached to a validation failure.
    pub fn fields(&self) -> Option<&FieldErrors> {
        match self {
            ClientError::Api { fields, .. } if !fields.is_empty() => Some(fields),
            ClientError::Commerce(CommerceError::Validation(fields)) => Some(fields),
            _ => None,
        }
    }

    /// Text suitable for showing next to the cart or checkout form.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Http(e) if e.is_timeout() => "The request timed out".to_string(),
            ClientError::Http(_) => "Could not reach the shop, check your connection".to_string(),
            ClientError::Commerce(e) => e.to_string(),
            ClientError::InvalidUrl(_) | ClientError::Parse(_) => {
                "Something went wrong, please try again".to_string()
            }
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Parse(e.to_string())
    }
}
