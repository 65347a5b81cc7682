//! Mail provider over HTTP.

use crate::{EmailMessage, MailError, Mailer};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use std::time::Duration;

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    tags: [&'a str; 1],
}

/// Posts messages as JSON to `<endpoint>/send` with a bearer key.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: Client,
    send_url: Url,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(
        endpoint: &str,
        api_key: impl Into<String>,
        from: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, MailError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        let base = format!("{}/", endpoint.trim_end_matches('/'));
        let send_url = Url::parse(&base)
            .and_then(|base| base.join("send"))
            .map_err(|e| MailError::Config(format!("invalid mail endpoint '{endpoint}': {e}")))?;
        Ok(Self {
            client,
            send_url,
            api_key: api_key.into(),
            from: from.into(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let request = SendRequest {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.text,
            tags: [&message.template],
        };
        let response = self
            .client
            .post(self.send_url.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
