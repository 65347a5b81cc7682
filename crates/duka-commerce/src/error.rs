//! Commerce error types.

use crate::validation::FieldErrors;
use thiserror::Error;

/// Errors that can occur in storefront operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Cart line not found.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Order not found (or not visible to the caller).
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Generic missing entity.
    #[error("{0} not found")]
    NotFound(String),

    /// Product cannot be bought right now.
    #[error("Product unavailable: {0}")]
    ProductUnavailable(String),

    /// Insufficient stock.
    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: i64,
        available: i64,
    },

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Invalid checkout state transition.
    #[error("Invalid checkout transition from {from} to {to}")]
    InvalidCheckoutTransition { from: String, to: String },

    /// Order status cannot move this way.
    #[error("Invalid order status change from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Field-level validation failures.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Unique constraint violated (slug, email, ...).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller may not act on this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Storage backend failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CommerceError {
    /// Build a single-field validation error.
    pub fn invalid(field: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        CommerceError::Validation(errors)
    }

    /// Whether this error means "the thing does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CommerceError::ProductNotFound(_)
                | CommerceError::CategoryNotFound(_)
                | CommerceError::ItemNotInCart(_)
                | CommerceError::OrderNotFound(_)
                | CommerceError::NotFound(_)
        )
    }
}

impl From<FieldErrors> for CommerceError {
    fn from(errors: FieldErrors) -> Self {
        CommerceError::Validation(errors)
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::Serialization(e.to_string())
    }
}
