//! Storefront domain types and logic for Duka.
//!
//! This crate holds everything the storefront knows independent of storage
//! and transport:
//!
//! - **Catalog**: Products, categories, reviews, listing queries
//! - **Cart**: Cart aggregate, owner, derived summary
//! - **Checkout**: Five-step wizard, pricing policy, orders
//! - **Wishlist** and admin-edited **content**
//! - **Repository** traits and the **services** built on them
//!
//! # Example
//!
//! ```rust
//! use duka_commerce::prelude::*;
//! use chrono::{Duration, Utc};
//!
//! let mut product = Product::new("Kikoi", "kikoi", Money::tzs(100_000));
//! product.stock = 10;
//!
//! let owner = CartOwner::Guest(SessionId::new("guest-1"));
//! let mut cart = Cart::new(owner, Currency::TZS, Utc::now(), Duration::days(30));
//! cart.add(&product, 2, AttributeSelection::new(), Utc::now()).unwrap();
//!
//! let quote = PricingPolicy::default()
//!     .quote(&cart.summary().unwrap(), "Arusha")
//!     .unwrap();
//! assert_eq!(quote.shipping, Money::tzs(15_000));
//! ```

pub mod clock;
pub mod error;
pub mod ids;
pub mod money;
pub mod validation;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod content;
pub mod repository;
pub mod service;
pub mod wishlist;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::clock::{Clock, FixedClock, SystemClock};
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::validation::FieldErrors;

    // Catalog
    pub use crate::catalog::{
        Category, NewReview, Page, Product, ProductDetail, ProductImage, ProductInput,
        ProductPatch, ProductQuery, ProductStatus, Review, SortOption,
    };

    // Cart
    pub use crate::cart::{
        AddToCart, AttributeSelection, Cart, CartItem, CartOwner, CartSummary, CartView,
        ProductSnapshot, UpdateQuantity,
    };

    // Checkout
    pub use crate::checkout::{
        CheckoutDetails, CheckoutStep, CheckoutWizard, ContactDetails, CreateOrder,
        DeliveryAddress, DeliveryMethod, MobileMoneyProvider, Order, OrderConfirmation,
        OrderItem, OrderStatus, OrderStatusUpdate, PaymentSelection, PaymentStatus, PriceBreakdown,
        PricingPolicy,
    };

    pub use crate::content::{ContactInfo, FaqEntry, FaqInput, SiteSettings, SupportTicket};
    pub use crate::wishlist::{WishlistEntry, WishlistItem};

    pub use crate::repository::{
        CartRepository, CatalogRepository, ContentRepository, OrderRepository,
        WishlistRepository,
    };
    pub use crate::service::{
        CartService, CatalogService, ContentService, OrderService, WishlistService,
    };
}
