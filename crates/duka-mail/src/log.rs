//! Mailer that only writes to the log.

use crate::{EmailMessage, MailError, Mailer};
use async_trait::async_trait;
use tracing::info;

/// Used when no provider is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            template = %message.template,
            "email (log only)"
        );
        Ok(())
    }
}
