//! Storefront client for Duka.
//!
//! [`HttpStorefront`] talks to the JSON API. [`CartStore`] keeps the
//! client's view of the cart with optimistic updates, and
//! [`CheckoutSession`] walks the checkout wizard and submits the order.
//! Both depend on the [`RemoteCart`] and [`OrderApi`] seams rather than on
//! HTTP, so they can run against any implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use duka_client::prelude::*;
//! use std::sync::Arc;
//!
//! let api = HttpStorefront::new("http://localhost:8080")?;
//! let cart = CartStore::new(Arc::new(api.clone()));
//! cart.initialize().await;
//! cart.add_item(&product, 2, Default::default()).await;
//! println!("{} items, {}", cart.summary().total_items, cart.summary().cart_total);
//! ```

mod checkout;
mod error;
mod http;
mod remote;
mod response;
mod store;

pub use checkout::CheckoutSession;
pub use error::ClientError;
pub use http::{HttpStorefront, SESSION_HEADER};
pub use remote::{OrderApi, RemoteCart};
pub use store::{CartState, CartStore, RollbackPolicy};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        CartState, CartStore, CheckoutSession, ClientError, HttpStorefront, OrderApi, RemoteCart,
        RollbackPolicy,
    };
}
