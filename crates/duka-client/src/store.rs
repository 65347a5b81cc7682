//! Client-side cart state with optimistic updates.
//!
//! Every mutation is applied locally first, then sent to the [`RemoteCart`].
//! A successful reply replaces the local lines with the server's list. A
//! failed one records a message in [`CartState::error`] and, depending on the
//! [`RollbackPolicy`], either keeps the optimistic lines or restores the last
//! list the server confirmed.

use crate::{ClientError, RemoteCart};
use duka_commerce::cart::{AddToCart, AttributeSelection, CartItem, CartSummary};
use duka_commerce::catalog::Product;
use duka_commerce::clock::{Clock, SystemClock};
use duka_commerce::error::CommerceError;
use duka_commerce::ids::{CartId, CartItemId};
use duka_commerce::money::Currency;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;

/// What to do with optimistic lines after the remote call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackPolicy {
    /// Leave the optimistic change in place.
    #[default]
    Keep,
    /// Go back to the last server-confirmed lines.
    RestoreSnapshot,
}

/// Everything a cart view renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    pub items: Vec<CartItem>,
    pub summary: CartSummary,
    /// True while a remote call is in flight.
    pub busy: bool,
    pub error: Option<String>,
}

impl CartState {
    fn empty(currency: Currency) -> Self {
        Self {
            items: Vec::new(),
            summary: CartSummary::empty(currency),
            busy: false,
            error: None,
        }
    }
}

/// State behind the store's lock.
#[derive(Debug)]
struct Shared {
    state: CartState,
    /// Lines as last confirmed by the server.
    confirmed: Vec<CartItem>,
    in_flight: usize,
}

impl Shared {
    fn begin(&mut self) {
        self.in_flight += 1;
        self.state.busy = true;
    }

    fn finish(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.state.busy = self.in_flight > 0;
    }

    fn recompute(&mut self, currency: Currency) {
        match CartSummary::from_items(&self.state.items, currency) {
            Ok(summary) => self.state.summary = summary,
            Err(e) => self.state.error = Some(e.to_string()),
        }
    }

    fn replace(&mut self, items: Vec<CartItem>, currency: Currency) {
        self.confirmed = items.clone();
        self.state.items = items;
        self.recompute(currency);
    }
}

/// Client-side cart. Clones share one state, so a view holding a clone sees
/// `busy` while another clone's call is in flight.
#[derive(Clone)]
pub struct CartStore {
    remote: Arc<dyn RemoteCart>,
    clock: Arc<dyn Clock>,
    policy: RollbackPolicy,
    currency: Currency,
    shared: Arc<RwLock<Shared>>,
}

impl CartStore {
    pub fn new(remote: Arc<dyn RemoteCart>) -> Self {
        let currency = Currency::default();
        Self {
            remote,
            clock: Arc::new(SystemClock),
            policy: RollbackPolicy::default(),
            currency,
            shared: Arc::new(RwLock::new(Shared {
                state: CartState::empty(currency),
                confirmed: Vec::new(),
                in_flight: 0,
            })),
        }
    }

    pub fn with_policy(mut self, policy: RollbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self.write().recompute(currency);
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, Shared> {
        self.shared.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Shared> {
        self.shared.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> CartState {
        self.read().state.clone()
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.read().state.items.clone()
    }

    pub fn summary(&self) -> CartSummary {
        self.read().state.summary
    }

    pub fn is_busy(&self) -> bool {
        self.read().state.busy
    }

    pub fn error(&self) -> Option<String> {
        self.read().state.error.clone()
    }

    pub fn clear_error(&self) {
        self.write().state.error = None;
    }

    pub fn policy(&self) -> RollbackPolicy {
        self.policy
    }

    /// Load the server's cart. On failure the local lines stay as they are.
    pub async fn initialize(&self) -> bool {
        self.write().begin();
        let result = self.remote.fetch().await;
        self.settle(result, "fetch")
    }

    /// Add `quantity` of `product`, merging into a line with the same
    /// attribute selection.
    pub async fn add_item(
        &self,
        product: &Product,
        quantity: i64,
        attributes: AttributeSelection,
    ) -> bool {
        if quantity <= 0 {
            self.write().state.error = Some(CommerceError::InvalidQuantity(quantity).to_string());
            return false;
        }
        let now = self.clock.now();
        {
            let mut shared = self.write();
            let items = &mut shared.state.items;
            match items
                .iter_mut()
                .find(|item| item.matches(&product.id, &attributes))
            {
                Some(item) => {
                    item.quantity = item.quantity.saturating_add(quantity);
                    item.updated_at = now;
                }
                None => {
                    let cart_id = items
                        .first()
                        .map(|item| item.cart_id)
                        .unwrap_or_else(CartId::generate);
                    items.push(CartItem::from_product(
                        cart_id,
                        product,
                        quantity,
                        attributes.clone(),
                        now,
                    ));
                }
            }
            shared.recompute(self.currency);
            shared.begin();
        }

        let request = AddToCart {
            product_id: product.id,
            quantity,
            attributes,
        };
        let result = self.remote.add(&request).await;
        self.settle(result, "add")
    }

    /// Set a line's quantity; zero or less removes it.
    pub async fn update_quantity(&self, item_id: CartItemId, quantity: i64) -> bool {
        let now = self.clock.now();
        {
            let mut shared = self.write();
            if quantity <= 0 {
                shared.state.items.retain(|item| item.id != item_id);
            } else if let Some(item) = shared.state.items.iter_mut().find(|item| item.id == item_id) {
                item.quantity = quantity;
                item.updated_at = now;
            }
            shared.recompute(self.currency);
            shared.begin();
        }

        let result = self.remote.update(item_id, quantity).await;
        self.settle(result, "update")
    }

    pub async fn remove_item(&self, item_id: CartItemId) -> bool {
        {
            let mut shared = self.write();
            shared.state.items.retain(|item| item.id != item_id);
            shared.recompute(self.currency);
            shared.begin();
        }

        let result = self.remote.remove(item_id).await;
        self.settle(result, "remove")
    }

    pub async fn clear(&self) -> bool {
        {
            let mut shared = self.write();
            shared.state.items.clear();
            shared.recompute(self.currency);
            shared.begin();
        }

        let result = self.remote.clear().await;
        self.settle(result, "clear")
    }

    /// Replace the lines with a list obtained elsewhere, e.g. the merged cart
    /// returned by login. No remote call.
    pub fn sync(&self, items: Vec<CartItem>) {
        self.write().replace(items, self.currency);
    }

    /// Finish a remote call. The busy flag drops once no call is in flight.
    fn settle(&self, result: Result<Vec<CartItem>, ClientError>, operation: &str) -> bool {
        let mut shared = self.write();
        shared.finish();
        match result {
            Ok(items) => {
                shared.state.error = None;
                shared.replace(items, self.currency);
                true
            }
            Err(e) => {
                warn!(operation, error = %e, policy = ?self.policy, "remote cart call failed");
                if self.policy == RollbackPolicy::RestoreSnapshot {
                    shared.state.items = shared.confirmed.clone();
                    shared.recompute(self.currency);
                }
                shared.state.error = Some(e.user_message());
                false
            }
        }
    }
}
