//! reqwest-backed storefront client.

use crate::response::decode;
use crate::{ClientError, OrderApi, RemoteCart};
use async_trait::async_trait;
use duka_commerce::cart::{AddToCart, CartItem, CartView, UpdateQuantity};
use duka_commerce::checkout::{CreateOrder, OrderConfirmation, PriceBreakdown, QuoteRequest};
use duka_commerce::ids::{CartItemId, SessionId};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::debug;

/// Header carrying the session id in both directions.
pub const SESSION_HEADER: &str = "x-session-id";

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Client for the storefront JSON API.
///
/// Remembers the session id the server hands out, so a guest keeps the same
/// cart across calls. Clones share the session.
#[derive(Debug, Clone)]
pub struct HttpStorefront {
    client: Client,
    base_url: Url,
    session: Arc<RwLock<Option<SessionId>>>,
}

impl HttpStorefront {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("duka-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalized).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        Ok(Self {
            client,
            base_url,
            session: Arc::new(RwLock::new(None)),
        })
    }

    /// Resume an existing session.
    pub fn with_session(self, session: SessionId) -> Self {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        self
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))?;
        let mut builder = self.client.request(method, url);
        if let Some(session) = self.session_id() {
            builder = builder.header(SESSION_HEADER, session.as_str());
        }
        Ok(builder)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        if let Some(session) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            let mut current = self.session.write().unwrap_or_else(PoisonError::into_inner);
            if current.as_ref().map(SessionId::as_str) != Some(session) {
                debug!(session, "session issued by server");
                *current = Some(SessionId::new(session));
            }
        }
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        decode(status, &body)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.request(Method::GET, path)?).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(self.request(Method::POST, path)?.json(body)).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(self.request(Method::PATCH, path)?.json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.request(Method::DELETE, path)?).await
    }

    pub async fn cart(&self) -> Result<CartView, ClientError> {
        self.get("/api/cart").await
    }
}

#[async_trait]
impl RemoteCart for HttpStorefront {
    async fn fetch(&self) -> Result<Vec<CartItem>, ClientError> {
        Ok(self.cart().await?.items)
    }

    async fn add(&self, request: &AddToCart) -> Result<Vec<CartItem>, ClientError> {
        let view: CartView = self.post("/api/cart/items", request).await?;
        Ok(view.items)
    }

    async fn update(&self, item_id: CartItemId, quantity: i64) -> Result<Vec<CartItem>, ClientError> {
        let view: CartView = self
            .patch(&format!("/api/cart/items/{item_id}"), &UpdateQuantity { quantity })
            .await?;
        Ok(view.items)
    }

    async fn remove(&self, item_id: CartItemId) -> Result<Vec<CartItem>, ClientError> {
        let view: CartView = self.delete(&format!("/api/cart/items/{item_id}")).await?;
        Ok(view.items)
    }

    async fn clear(&self) -> Result<Vec<CartItem>, ClientError> {
        let view: CartView = self.delete("/api/cart").await?;
        Ok(view.items)
    }
}

#[async_trait]
impl OrderApi for HttpStorefront {
    async fn quote(&self, region: &str) -> Result<PriceBreakdown, ClientError> {
        let request = QuoteRequest {
            region: region.to_string(),
        };
        self.post("/api/checkout/quote", &request).await
    }

    async fn create_order(&self, order: &CreateOrder) -> Result<OrderConfirmation, ClientError> {
        self.post("/api/orders", order).await
    }
}
