//! Saved-for-later products.

use crate::cart::CartOwner;
use crate::catalog::Product;
use crate::ids::ProductId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One saved product. Unique per (owner, product).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WishlistEntry {
    pub owner: CartOwner,
    pub product_id: ProductId,
    pub added_at: DateTime<Utc>,
}

/// A wishlist entry joined with its product, as listed to the customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WishlistItem {
    pub product: Product,
    pub added_at: DateTime<Utc>,
}

/// Body of an add-to-wishlist call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddToWishlist {
    pub product_id: ProductId,
}
