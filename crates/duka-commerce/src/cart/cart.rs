//! Cart and cart item types.

use crate::cart::{CartOwner, CartSummary};
use crate::catalog::{Product, ProductStatus};
use crate::error::CommerceError;
use crate::ids::{CartId, CartItemId, ProductId};
use crate::money::{Currency, Money};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum quantity allowed per cart line.
pub const MAX_QUANTITY_PER_ITEM: i64 = 99;

/// Days a cart lives after its last update.
pub const DEFAULT_CART_TTL_DAYS: i64 = 30;

/// Selected attribute values, e.g. `size -> M`. Empty means no selection.
pub type AttributeSelection = BTreeMap<String, String>;

/// Product display data copied onto a cart line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSnapshot {
    pub name: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub stock: i64,
    pub status: ProductStatus,
    pub original_price: Money,
    pub sale_price: Option<Money>,
    pub is_discounted: bool,
}

/// A line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Unique line identifier.
    pub id: CartItemId,
    /// Owning cart.
    pub cart_id: CartId,
    pub product_id: ProductId,
    /// Always positive.
    pub quantity: i64,
    /// Price captured when the line was created.
    pub unit_price: Money,
    #[serde(default)]
    pub attributes: AttributeSelection,
    pub product: ProductSnapshot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartItem {
    /// Build a new line priced at the product's effective price.
    pub fn from_product(
        cart_id: CartId,
        product: &Product,
        quantity: i64,
        attributes: AttributeSelection,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CartItemId::generate(),
            cart_id,
            product_id: product.id,
            quantity,
            unit_price: product.effective_price(),
            attributes,
            product: product.snapshot(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Same product and exactly the same attribute selection.
    pub fn matches(&self, product_id: &ProductId, attributes: &AttributeSelection) -> bool {
        self.product_id == *product_id && self.attributes == *attributes
    }

    /// `unit_price * quantity`.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.unit_price
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)
    }

    /// Original price times quantity.
    pub fn original_line_total(&self) -> Result<Money, CommerceError> {
        self.product
            .original_price
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)
    }
}

/// A shopping cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Unique cart identifier.
    pub id: CartId,
    pub owner: CartOwner,
    /// Items in the cart.
    pub items: Vec<CartItem>,
    /// Cart currency.
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Cart is discarded after this instant.
    pub expires_at: DateTime<Utc>,
}

impl Cart {
    /// Create an empty cart for an owner.
    pub fn new(owner: CartOwner, currency: Currency, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: CartId::generate(),
            owner,
            items: Vec::new(),
            currency,
            created_at: now,
            updated_at: now,
            expires_at: now + ttl,
        }
    }

    /// Add a product, merging with an existing line when product and
    /// attributes match. Returns the affected line id.
    ///
    /// Returns an error if:
    /// - Quantity is not positive or exceeds MAX_QUANTITY_PER_ITEM
    /// - The product is not active, or the selection names unknown options
    /// - The resulting quantity exceeds stock
    pub fn add(
        &mut self,
        product: &Product,
        quantity: i64,
        attributes: AttributeSelection,
        now: DateTime<Utc>,
    ) -> Result<CartItemId, CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        if !product.is_available() {
            return Err(CommerceError::ProductUnavailable(product.name.clone()));
        }
        product.validate_selection(&attributes)?;

        let existing = self
            .items
            .iter()
            .position(|i| i.matches(&product.id, &attributes));
        let current = existing.map(|idx| self.items[idx].quantity).unwrap_or(0);
        let new_quantity = current
            .checked_add(quantity)
            .ok_or(CommerceError::Overflow)?;
        check_quantity(product, new_quantity)?;

        let id = match existing {
            Some(idx) => {
                let item = &mut self.items[idx];
                item.quantity = new_quantity;
                item.product = product.snapshot();
                item.updated_at = now;
                item.id
            }
            None => {
                let item = CartItem::from_product(self.id, product, quantity, attributes, now);
                let id = item.id;
                self.items.push(item);
                id
            }
        };
        self.updated_at = now;
        Ok(id)
    }

    /// Set a line's quantity. Zero or less removes the line.
    ///
    /// Stock is checked against the line's product snapshot; callers refresh
    /// it with [`Cart::refresh_product`] first when they have the product.
    pub fn update_quantity(
        &mut self,
        item_id: &CartItemId,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> Result<(), CommerceError> {
        if quantity <= 0 {
            return self.remove(item_id, now);
        }
        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }
        let item = self
            .items
            .iter_mut()
            .find(|i| &i.id == item_id)
            .ok_or_else(|| CommerceError::ItemNotInCart(item_id.to_string()))?;
        if quantity > item.product.stock {
            return Err(CommerceError::InsufficientStock {
                product: item.product.name.clone(),
                requested: quantity,
                available: item.product.stock,
            });
        }
        item.quantity = quantity;
        item.updated_at = now;
        self.updated_at = now;
        Ok(())
    }

    /// Remove a line.
    pub fn remove(&mut self, item_id: &CartItemId, now: DateTime<Utc>) -> Result<(), CommerceError> {
        let len_before = self.items.len();
        self.items.retain(|i| &i.id != item_id);
        if self.items.len() == len_before {
            return Err(CommerceError::ItemNotInCart(item_id.to_string()));
        }
        self.updated_at = now;
        Ok(())
    }

    /// Clear all items from the cart.
    pub fn clear(&mut self, now: DateTime<Utc>) {
        self.items.clear();
        self.updated_at = now;
    }

    /// Refresh the display snapshot on every line for this product.
    /// Captured unit prices are left alone.
    pub fn refresh_product(&mut self, product: &Product) {
        for item in self.items.iter_mut().filter(|i| i.product_id == product.id) {
            item.product = product.snapshot();
        }
    }

    /// Fold another cart into this one (guest cart on login).
    ///
    /// Matching lines sum their quantities, capped at MAX_QUANTITY_PER_ITEM;
    /// other lines move over with their captured prices.
    pub fn merge(&mut self, other: Cart, now: DateTime<Utc>) {
        for mut item in other.items {
            if let Some(existing) = self
                .items
                .iter_mut()
                .find(|i| i.matches(&item.product_id, &item.attributes))
            {
                existing.quantity = existing
                    .quantity
                    .saturating_add(item.quantity)
                    .min(MAX_QUANTITY_PER_ITEM);
                existing.updated_at = now;
            } else {
                item.cart_id = self.id;
                item.updated_at = now;
                self.items.push(item);
            }
        }
        self.updated_at = now;
    }

    /// Push the expiry out to `ttl` after `now`.
    pub fn extend_expiry(&mut self, now: DateTime<Utc>, ttl: Duration) {
        self.expires_at = now + ttl;
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Get an item by ID.
    pub fn get_item(&self, item_id: &CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.id == item_id)
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Recompute totals.
    pub fn summary(&self) -> Result<CartSummary, CommerceError> {
        CartSummary::from_items(&self.items, self.currency)
    }
}

fn check_quantity(product: &Product, quantity: i64) -> Result<(), CommerceError> {
    if quantity > MAX_QUANTITY_PER_ITEM {
        return Err(CommerceError::QuantityExceedsLimit(
            quantity,
            MAX_QUANTITY_PER_ITEM,
        ));
    }
    if quantity > product.stock {
        return Err(CommerceError::InsufficientStock {
            product: product.name.clone(),
            requested: quantity,
            available: product.stock,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SessionId;

    fn guest_cart() -> Cart {
        Cart::new(
            CartOwner::Guest(SessionId::new("session-123")),
            Currency::TZS,
            Utc::now(),
            Duration::days(DEFAULT_CART_TTL_DAYS),
        )
    }

    fn product(price: i64) -> Product {
        let mut p = Product::new("Kikoi", "kikoi", Money::tzs(price));
        p.stock = 50;
        p.attributes.insert(
            "color".to_string(),
            vec!["red".to_string(), "blue".to_string()],
        );
        p
    }

    fn color(value: &str) -> AttributeSelection {
        AttributeSelection::from([("color".to_string(), value.to_string())])
    }

    #[test]
    fn test_cart_creation() {
        let cart = guest_cart();
        assert!(cart.is_empty());
        assert!(!cart.is_expired(Utc::now()));
        assert!(cart.is_expired(Utc::now() + Duration::days(31)));
    }

    #[test]
    fn test_same_selection_merges() {
        let mut cart = guest_cart();
        let p = product(10_000);
        let a = cart.add(&p, 1, color("red"), Utc::now()).unwrap();
        let b = cart.add(&p, 2, color("red"), Utc::now()).unwrap();
        assert_eq!(a, b);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_different_selection_is_new_line() {
        let mut cart = guest_cart();
        let p = product(10_000);
        cart.add(&p, 1, color("red"), Utc::now()).unwrap();
        cart.add(&p, 1, color("blue"), Utc::now()).unwrap();
        cart.add(&p, 1, AttributeSelection::new(), Utc::now()).unwrap();
        assert_eq!(cart.items.len(), 3);
    }

    #[test]
    fn test_unit_price_fixed_at_add_time() {
        let mut cart = guest_cart();
        let mut p = product(10_000);
        cart.add(&p, 1, AttributeSelection::new(), Utc::now()).unwrap();
        p.price = Money::tzs(12_000);
        cart.add(&p, 1, AttributeSelection::new(), Utc::now()).unwrap();
        assert_eq!(cart.items[0].unit_price, Money::tzs(10_000));
        assert_eq!(cart.items[0].quantity, 2);
    }

    #[test]
    fn test_sale_price_captured() {
        let mut cart = guest_cart();
        let mut p = product(10_000);
        p.sale_price = Some(Money::tzs(8_000));
        cart.add(&p, 1, AttributeSelection::new(), Utc::now()).unwrap();
        assert_eq!(cart.items[0].unit_price, Money::tzs(8_000));
        assert!(cart.items[0].product.is_discounted);
    }

    #[test]
    fn test_update_to_zero_removes() {
        let mut cart = guest_cart();
        let id = cart
            .add(&product(1_000), 2, AttributeSelection::new(), Utc::now())
            .unwrap();
        cart.update_quantity(&id, 5, Utc::now()).unwrap();
        assert_eq!(cart.item_count(), 5);
        cart.update_quantity(&id, 0, Utc::now()).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_missing_line() {
        let mut cart = guest_cart();
        let err = cart.remove(&CartItemId::generate(), Utc::now()).unwrap_err();
        assert!(err.is_not_found());
        let err = cart
            .update_quantity(&CartItemId::generate(), 3, Utc::now())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_stock_and_status_checks() {
        let mut cart = guest_cart();
        let mut p = product(1_000);
        p.stock = 2;
        assert!(matches!(
            cart.add(&p, 3, AttributeSelection::new(), Utc::now()),
            Err(CommerceError::InsufficientStock { available: 2, .. })
        ));
        assert!(matches!(
            cart.add(&p, 0, AttributeSelection::new(), Utc::now()),
            Err(CommerceError::InvalidQuantity(0))
        ));
        p.status = ProductStatus::Draft;
        assert!(matches!(
            cart.add(&p, 1, AttributeSelection::new(), Utc::now()),
            Err(CommerceError::ProductUnavailable(_))
        ));
    }

    #[test]
    fn test_invalid_selection_rejected() {
        let mut cart = guest_cart();
        let result = cart.add(&product(1_000), 1, color("green"), Utc::now());
        assert!(matches!(result, Err(CommerceError::Validation(_))));
    }

    #[test]
    fn test_merge_sums_matching_lines() {
        let p = product(5_000);
        let other = product(7_000);

        let mut user_cart = guest_cart();
        user_cart.add(&p, 1, color("red"), Utc::now()).unwrap();

        let mut guest = guest_cart();
        guest.add(&p, 2, color("red"), Utc::now()).unwrap();
        guest.add(&other, 1, AttributeSelection::new(), Utc::now()).unwrap();

        user_cart.merge(guest, Utc::now());
        assert_eq!(user_cart.items.len(), 2);
        assert_eq!(user_cart.item_count(), 4);
        assert!(user_cart.items.iter().all(|i| i.cart_id == user_cart.id));
    }

    #[test]
    fn test_summary_matches_lines() {
        let mut cart = guest_cart();
        let mut a = product(100_000);
        a.id = ProductId::generate();
        let mut b = product(50_000);
        b.id = ProductId::generate();
        cart.add(&a, 2, AttributeSelection::new(), Utc::now()).unwrap();
        cart.add(&b, 1, AttributeSelection::new(), Utc::now()).unwrap();
        let summary = cart.summary().unwrap();
        assert_eq!(summary.cart_total, Money::tzs(250_000));
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.total_unique_items, 2);
    }

    /// Totals recomputed by hand from the lines.
    fn assert_totals_match_lines(cart: &Cart) {
        let summary = cart.summary().unwrap();
        let total: i64 = cart
            .items
            .iter()
            .map(|i| i.unit_price.amount * i.quantity)
            .sum();
        let original: i64 = cart
            .items
            .iter()
            .map(|i| i.product.original_price.amount * i.quantity)
            .sum();
        let quantity: i64 = cart.items.iter().map(|i| i.quantity).sum();
        assert_eq!(summary.cart_total, Money::tzs(total));
        assert_eq!(summary.original_total, Money::tzs(original));
        assert_eq!(summary.total_discount, Money::tzs(original - total));
        assert_eq!(summary.total_items, quantity);
        assert_eq!(summary.total_unique_items, cart.items.len() as i64);
        assert_eq!(summary.is_empty, cart.items.is_empty());
    }

    #[test]
    fn test_totals_follow_mixed_sequences() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut catalog = vec![product(12_000), product(45_000), product(7_500)];
        catalog[1].sale_price = Some(Money::tzs(39_000));
        let colors = ["red", "blue"];
        let key_of = |line: &CartItem| -> (usize, &'static str) {
            let p = catalog.iter().position(|x| x.id == line.product_id).unwrap();
            let c = colors
                .iter()
                .copied()
                .find(|c| line.attributes["color"] == *c)
                .unwrap();
            (p, c)
        };

        for seed in 0..20u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut cart = guest_cart();
            // Expected quantity per (product, color) line.
            let mut expected: BTreeMap<(usize, &str), i64> = BTreeMap::new();

            for _ in 0..200 {
                match rng.gen_range(0..3) {
                    0 => {
                        let p = rng.gen_range(0..catalog.len());
                        let c: &'static str = colors[rng.gen_range(0..colors.len())];
                        let qty = rng.gen_range(1..6);
                        if cart.add(&catalog[p], qty, color(c), Utc::now()).is_ok() {
                            *expected.entry((p, c)).or_insert(0) += qty;
                        }
                    }
                    1 if !cart.items.is_empty() => {
                        let idx = rng.gen_range(0..cart.items.len());
                        let line = cart.items[idx].clone();
                        let qty = rng.gen_range(0..11);
                        cart.update_quantity(&line.id, qty, Utc::now()).unwrap();
                        let key = key_of(&line);
                        if qty == 0 {
                            expected.remove(&key);
                        } else {
                            expected.insert(key, qty);
                        }
                    }
                    2 if !cart.items.is_empty() => {
                        let idx = rng.gen_range(0..cart.items.len());
                        let line = cart.items[idx].clone();
                        cart.remove(&line.id, Utc::now()).unwrap();
                        let key = key_of(&line);
                        expected.remove(&key);
                    }
                    _ => {}
                }

                assert_totals_match_lines(&cart);
                assert_eq!(cart.items.len(), expected.len(), "seed {seed}");
                for ((p, c), qty) in &expected {
                    let line = cart
                        .items
                        .iter()
                        .find(|i| i.matches(&catalog[*p].id, &color(c)))
                        .unwrap();
                    assert_eq!(line.quantity, *qty, "seed {seed}");
                }
            }
        }
    }
}
