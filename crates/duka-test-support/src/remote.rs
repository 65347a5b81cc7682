//! Scripted stand-ins for the storefront API.

use crate::clock::fixed_now;
use async_trait::async_trait;
use chrono::Duration;
use duka_client::{ClientError, OrderApi, RemoteCart};
use duka_commerce::cart::{AddToCart, Cart, CartItem, CartOwner};
use duka_commerce::catalog::Product;
use duka_commerce::checkout::{CreateOrder, Order, OrderConfirmation, PriceBreakdown};
use duka_commerce::error::CommerceError;
use duka_commerce::ids::{CartItemId, OrderId, ProductId, SessionId};
use duka_commerce::money::Currency;
use duka_commerce::validation::FieldErrors;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

fn unavailable() -> ClientError {
    ClientError::Api {
        status: 503,
        code: "unavailable".to_string(),
        message: "Service unavailable".to_string(),
        fields: FieldErrors::new(),
    }
}

fn rejected(status: u16, e: CommerceError) -> ClientError {
    ClientError::Api {
        status,
        code: "rejected".to_string(),
        message: e.to_string(),
        fields: FieldErrors::new(),
    }
}

/// A server cart kept in memory, with switchable failure.
///
/// Applies the same merge and stock rules as the real cart so replies look
/// like the server's.
#[derive(Debug)]
pub struct ScriptedRemoteCart {
    cart: Mutex<Cart>,
    products: Mutex<HashMap<ProductId, Product>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl Default for ScriptedRemoteCart {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedRemoteCart {
    pub fn new() -> Self {
        let owner = CartOwner::Guest(SessionId::new("sess_scripted"));
        Self {
            cart: Mutex::new(Cart::new(owner, Currency::TZS, fixed_now(), Duration::days(30))),
            products: Mutex::default(),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Make `product` addable.
    pub fn stock(&self, product: Product) {
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(product.id, product);
    }

    /// While set, every call fails with a 503 and changes nothing.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn server_items(&self) -> Vec<CartItem> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner).items.clone()
    }

    fn apply<F>(&self, change: F) -> Result<Vec<CartItem>, ClientError>
    where
        F: FnOnce(&mut Cart) -> Result<(), ClientError>,
    {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        change(&mut cart)?;
        Ok(cart.items.clone())
    }
}

#[async_trait]
impl RemoteCart for ScriptedRemoteCart {
    async fn fetch(&self) -> Result<Vec<CartItem>, ClientError> {
        self.apply(|_| Ok(()))
    }

    async fn add(&self, request: &AddToCart) -> Result<Vec<CartItem>, ClientError> {
        let product = self
            .products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&request.product_id)
            .cloned();
        self.apply(|cart| {
            let product = product.ok_or_else(|| {
                rejected(404, CommerceError::ProductNotFound(request.product_id.to_string()))
            })?;
            cart.add(&product, request.quantity, request.attributes.clone(), fixed_now())
                .map(|_| ())
                .map_err(|e| rejected(400, e))
        })
    }

    async fn update(&self, item_id: CartItemId, quantity: i64) -> Result<Vec<CartItem>, ClientError> {
        self.apply(|cart| {
            cart.update_quantity(&item_id, quantity, fixed_now())
                .map_err(|e| rejected(400, e))
        })
    }

    async fn remove(&self, item_id: CartItemId) -> Result<Vec<CartItem>, ClientError> {
        self.apply(|cart| cart.remove(&item_id, fixed_now()).map_err(|e| rejected(404, e)))
    }

    async fn clear(&self) -> Result<Vec<CartItem>, ClientError> {
        self.apply(|cart| {
            cart.clear(fixed_now());
            Ok(())
        })
    }
}

/// Order endpoint that records submissions.
#[derive(Debug, Default)]
pub struct ScriptedOrderApi {
    submitted: Mutex<Vec<CreateOrder>>,
    failing: AtomicBool,
}

impl ScriptedOrderApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn submitted(&self) -> Vec<CreateOrder> {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl OrderApi for ScriptedOrderApi {
    async fn quote(&self, _region: &str) -> Result<PriceBreakdown, ClientError> {
        Err(ClientError::Api {
            status: 501,
            code: "not_implemented".to_string(),
            message: "Quotes are computed locally".to_string(),
            fields: FieldErrors::new(),
        })
    }

    async fn create_order(&self, order: &CreateOrder) -> Result<OrderConfirmation, ClientError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(order.clone());
        Ok(OrderConfirmation {
            order_id: OrderId::generate(),
            order_number: Order::generate_order_number(fixed_now()),
        })
    }
}
