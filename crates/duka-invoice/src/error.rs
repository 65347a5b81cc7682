//! Invoice errors.

use duka_commerce::error::CommerceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Loading or updating the order failed.
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The object store refused the upload.
    #[error("Upload of {key} failed: {reason}")]
    Upload { key: String, reason: String },

    #[error("Invalid storage configuration: {0}")]
    Config(String),
}

impl InvoiceError {
    /// True when the order itself does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, InvoiceError::Commerce(e) if e.is_not_found())
    }
}
