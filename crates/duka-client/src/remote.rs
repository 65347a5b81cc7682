//! The remote seams the cart store and checkout session talk through.

use crate::ClientError;
use async_trait::async_trait;
use duka_commerce::cart::{AddToCart, CartItem};
use duka_commerce::checkout::{CreateOrder, OrderConfirmation, PriceBreakdown};
use duka_commerce::ids::CartItemId;

/// Server-side cart. Every call answers with the authoritative line list.
#[async_trait]
pub trait RemoteCart: Send + Sync {
    async fn fetch(&self) -> Result<Vec<CartItem>, ClientError>;
    async fn add(&self, request: &AddToCart) -> Result<Vec<CartItem>, ClientError>;
    async fn update(&self, item_id: CartItemId, quantity: i64) -> Result<Vec<CartItem>, ClientError>;
    async fn remove(&self, item_id: CartItemId) -> Result<Vec<CartItem>, ClientError>;
    async fn clear(&self) -> Result<Vec<CartItem>, ClientError>;
}

/// Checkout endpoints.
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn quote(&self, region: &str) -> Result<PriceBreakdown, ClientError>;
    async fn create_order(&self, order: &CreateOrder) -> Result<OrderConfirmation, ClientError>;
}
