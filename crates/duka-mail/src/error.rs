//! Mail delivery errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    /// Network or TLS failure talking to the provider.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Mail provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// Endpoint or sender settings are unusable.
    #[error("Invalid mail configuration: {0}")]
    Config(String),
}
