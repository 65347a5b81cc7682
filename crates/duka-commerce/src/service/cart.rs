//! Server-side cart operations.

use crate::cart::{AddToCart, AttributeSelection, Cart, CartOwner, DEFAULT_CART_TTL_DAYS};
use crate::clock::Clock;
use crate::error::CommerceError;
use crate::ids::{CartItemId, ProductId};
use crate::money::Currency;
use crate::repository::{CartRepository, CatalogRepository};
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Cart use cases over the cart and catalog repositories.
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartRepository>,
    catalog: Arc<dyn CatalogRepository>,
    clock: Arc<dyn Clock>,
    currency: Currency,
    ttl: Duration,
}

impl CartService {
    pub fn new(
        carts: Arc<dyn CartRepository>,
        catalog: Arc<dyn CatalogRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            carts,
            catalog,
            clock,
            currency: Currency::TZS,
            ttl: Duration::days(DEFAULT_CART_TTL_DAYS),
        }
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_ttl_days(mut self, days: i64) -> Self {
        self.ttl = Duration::days(days.max(1));
        self
    }

    /// The owner's live cart. A missing or expired cart reads as a new
    /// empty one that is not stored until the first mutation.
    #[instrument(skip_all, fields(owner = %owner))]
    pub async fn get(&self, owner: &CartOwner) -> Result<Cart, CommerceError> {
        let now = self.clock.now();
        match self.carts.find_by_owner(owner).await? {
            Some(cart) if !cart.is_expired(now) => Ok(cart),
            _ => Ok(self.fresh(owner)),
        }
    }

    /// The cart a mutation starts from. An expired cart is deleted so its
    /// replacement can take the owner's slot.
    async fn load(&self, owner: &CartOwner) -> Result<Cart, CommerceError> {
        let now = self.clock.now();
        if let Some(cart) = self.carts.find_by_owner(owner).await? {
            if !cart.is_expired(now) {
                return Ok(cart);
            }
            debug!(cart_id = %cart.id, "discarding expired cart");
            self.carts.delete(cart.id).await?;
        }
        Ok(self.fresh(owner))
    }

    fn fresh(&self, owner: &CartOwner) -> Cart {
        Cart::new(owner.clone(), self.currency, self.clock.now(), self.ttl)
    }

    /// Add a product, merging with a matching line.
    #[instrument(skip_all, fields(owner = %owner, product_id = %request.product_id))]
    pub async fn add(&self, owner: &CartOwner, request: AddToCart) -> Result<Cart, CommerceError> {
        let product = self
            .catalog
            .get_product(request.product_id)
            .await?
            .ok_or_else(|| CommerceError::ProductNotFound(request.product_id.to_string()))?;
        let mut cart = self.load(owner).await?;
        let now = self.clock.now();
        cart.add(&product, request.quantity, request.attributes, now)?;
        self.persist(&mut cart).await?;
        info!(cart_id = %cart.id, quantity = request.quantity, "added to cart");
        Ok(cart)
    }

    /// Shorthand for adding one unit with no attribute selection.
    pub async fn add_one(&self, owner: &CartOwner, product_id: ProductId) -> Result<Cart, CommerceError> {
        self.add(
            owner,
            AddToCart {
                product_id,
                quantity: 1,
                attributes: AttributeSelection::new(),
            },
        )
        .await
    }

    /// Set a line's quantity; zero or less removes it.
    #[instrument(skip_all, fields(owner = %owner))]
    pub async fn update_quantity(
        &self,
        owner: &CartOwner,
        item_id: CartItemId,
        quantity: i64,
    ) -> Result<Cart, CommerceError> {
        let mut cart = self.load(owner).await?;
        let product_id = cart
            .get_item(&item_id)
            .map(|i| i.product_id)
            .ok_or_else(|| CommerceError::ItemNotInCart(item_id.to_string()))?;
        if quantity > 0 {
            if let Some(product) = self.catalog.get_product(product_id).await? {
                cart.refresh_product(&product);
            }
        }
        cart.update_quantity(&item_id, quantity, self.clock.now())?;
        self.persist(&mut cart).await?;
        Ok(cart)
    }

    #[instrument(skip_all, fields(owner = %owner))]
    pub async fn remove(&self, owner: &CartOwner, item_id: CartItemId) -> Result<Cart, CommerceError> {
        let mut cart = self.load(owner).await?;
        cart.remove(&item_id, self.clock.now())?;
        self.persist(&mut cart).await?;
        Ok(cart)
    }

    #[instrument(skip_all, fields(owner = %owner))]
    pub async fn clear(&self, owner: &CartOwner) -> Result<Cart, CommerceError> {
        let mut cart = self.load(owner).await?;
        cart.clear(self.clock.now());
        self.persist(&mut cart).await?;
        Ok(cart)
    }

    /// Fold the guest's cart into the user's cart and delete the guest cart.
    #[instrument(skip_all, fields(guest = %guest, user = %user))]
    pub async fn merge(&self, guest: &CartOwner, user: &CartOwner) -> Result<Cart, CommerceError> {
        let Some(guest_cart) = self.carts.find_by_owner(guest).await? else {
            return self.get(user).await;
        };
        let now = self.clock.now();
        let mut cart = self.load(user).await?;
        let guest_id = guest_cart.id;
        if !guest_cart.is_expired(now) {
            let moved = guest_cart.items.len();
            cart.merge(guest_cart, now);
            info!(moved, "merged guest cart");
        }
        self.persist(&mut cart).await?;
        self.carts.delete(guest_id).await?;
        Ok(cart)
    }

    async fn persist(&self, cart: &mut Cart) -> Result<(), CommerceError> {
        cart.extend_expiry(self.clock.now(), self.ttl);
        self.carts.save(cart).await
    }
}
