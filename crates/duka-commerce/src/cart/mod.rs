//! Shopping cart module.
//!
//! Contains the cart aggregate, its owner, derived totals, and the request
//! and response bodies of the cart API.

#[allow(clippy::module_inception)]
mod cart;
mod owner;
mod summary;

pub use cart::{
    AttributeSelection, Cart, CartItem, ProductSnapshot, DEFAULT_CART_TTL_DAYS,
    MAX_QUANTITY_PER_ITEM,
};
pub use owner::CartOwner;
pub use summary::CartSummary;

use crate::error::CommerceError;
use crate::ids::{CartId, ProductId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of an add-to-cart call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddToCart {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub attributes: AttributeSelection,
}

fn default_quantity() -> i64 {
    1
}

/// Body of a quantity update.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateQuantity {
    pub quantity: i64,
}

/// The cart as returned by the API: authoritative lines plus totals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartView {
    pub id: CartId,
    pub items: Vec<CartItem>,
    pub summary: CartSummary,
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<Cart> for CartView {
    type Error = CommerceError;

    fn try_from(cart: Cart) -> Result<Self, Self::Error> {
        let summary = cart.summary()?;
        Ok(Self {
            id: cart.id,
            items: cart.items,
            summary,
            expires_at: cart.expires_at,
        })
    }
}
