//! Object storage for generated documents.

use crate::InvoiceError;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key` and return the object's public URL.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, InvoiceError>;
}

#[derive(Serialize)]
struct PresignRequest<'a> {
    key: &'a str,
    content_type: &'a str,
}

#[derive(Deserialize)]
struct PresignResponse {
    upload_url: String,
}

/// Uploads through presigned URLs.
///
/// `POST <endpoint>/presign` hands out a one-time upload URL, the bytes are
/// `PUT` there, and the object is then served from `<public_base_url>/<key>`.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: Client,
    presign_url: Url,
    public_base_url: String,
    api_key: Option<String>,
}

impl HttpObjectStore {
    pub fn new(
        endpoint: &str,
        public_base_url: &str,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, InvoiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let base = format!("{}/", endpoint.trim_end_matches('/'));
        let presign_url = Url::parse(&base)
            .and_then(|base| base.join("presign"))
            .map_err(|e| InvoiceError::Config(format!("invalid storage endpoint '{endpoint}': {e}")))?;
        Ok(Self {
            client,
            presign_url,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, InvoiceError> {
        let mut request = self
            .client
            .post(self.presign_url.clone())
            .json(&PresignRequest { key, content_type });
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(InvoiceError::Upload {
                key: key.to_string(),
                reason: format!("presign returned {}", response.status()),
            });
        }
        let presigned: PresignResponse = response.json().await?;
        debug!(key, "presigned upload url issued");

        let size = bytes.len();
        let response = self
            .client
            .put(&presigned.upload_url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(InvoiceError::Upload {
                key: key.to_string(),
                reason: format!("upload returned {}", response.status()),
            });
        }
        debug!(key, size, "object uploaded");
        Ok(self.public_url(key))
    }
}
