//! The delivery seam.

use crate::MailError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A rendered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    /// Template name, for logs and tests.
    pub template: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Send if there is something to send; log and swallow failures.
///
/// Returns whether the message was delivered.
pub async fn dispatch(mailer: &dyn Mailer, message: Option<EmailMessage>) -> bool {
    let Some(message) = message else {
        return false;
    };
    match mailer.send(&message).await {
        Ok(()) => {
            info!(template = %message.template, "email sent");
            true
        }
        Err(e) => {
            warn!(template = %message.template, error = %e, "email delivery failed");
            false
        }
    }
}
