//! Wishlist operations.

use crate::cart::{Cart, CartOwner};
use crate::clock::Clock;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::repository::{CatalogRepository, WishlistRepository};
use crate::service::CartService;
use crate::wishlist::{WishlistEntry, WishlistItem};
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct WishlistService {
    wishlists: Arc<dyn WishlistRepository>,
    catalog: Arc<dyn CatalogRepository>,
    carts: CartService,
    clock: Arc<dyn Clock>,
}

impl WishlistService {
    pub fn new(
        wishlists: Arc<dyn WishlistRepository>,
        catalog: Arc<dyn CatalogRepository>,
        carts: CartService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            wishlists,
            catalog,
            carts,
            clock,
        }
    }

    /// Saved products that still exist, newest first.
    pub async fn list(&self, owner: &CartOwner) -> Result<Vec<WishlistItem>, CommerceError> {
        let entries = self.wishlists.list(owner).await?;
        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            match self.catalog.get_product(entry.product_id).await? {
                Some(product) => items.push(WishlistItem {
                    product,
                    added_at: entry.added_at,
                }),
                None => debug!(product_id = %entry.product_id, "skipping deleted product"),
            }
        }
        Ok(items)
    }

    /// Save a product. Saving twice is a no-op.
    #[instrument(skip_all, fields(owner = %owner, product_id = %product_id))]
    pub async fn add(&self, owner: &CartOwner, product_id: ProductId) -> Result<Vec<WishlistItem>, CommerceError> {
        let product = self
            .catalog
            .get_product(product_id)
            .await?
            .filter(|p| p.is_available())
            .ok_or_else(|| CommerceError::ProductNotFound(product_id.to_string()))?;
        let entry = WishlistEntry {
            owner: owner.clone(),
            product_id: product.id,
            added_at: self.clock.now(),
        };
        self.wishlists.add(&entry).await?;
        self.list(owner).await
    }

    pub async fn remove(&self, owner: &CartOwner, product_id: ProductId) -> Result<Vec<WishlistItem>, CommerceError> {
        if !self.wishlists.remove(owner, product_id).await? {
            return Err(CommerceError::NotFound(format!("Wishlist entry {product_id}")));
        }
        self.list(owner).await
    }

    /// Add one unit to the cart, then drop the wishlist entry.
    #[instrument(skip_all, fields(owner = %owner, product_id = %product_id))]
    pub async fn move_to_cart(&self, owner: &CartOwner, product_id: ProductId) -> Result<Cart, CommerceError> {
        let saved = self
            .wishlists
            .list(owner)
            .await?
            .iter()
            .any(|e| e.product_id == product_id);
        if !saved {
            return Err(CommerceError::NotFound(format!("Wishlist entry {product_id}")));
        }
        let cart = self.carts.add_one(owner, product_id).await?;
        self.wishlists.remove(owner, product_id).await?;
        Ok(cart)
    }
}
