//! Checkout module.
//!
//! Contains the five-step checkout wizard, its forms, the pricing policy,
//! and orders.

mod address;
mod flow;
mod order;
mod payment;
mod pricing;

pub use address::{validate_instructions, ContactDetails, DeliveryAddress, MAX_INSTRUCTIONS_LEN};
pub use flow::{CheckoutDetails, CheckoutStep, CheckoutWizard};
pub use order::{
    CreateOrder, Order, OrderConfirmation, OrderItem, OrderLineInput, OrderStatus,
    OrderStatusUpdate, PaymentStatus,
};
pub use payment::{DeliveryMethod, MobileMoneyProvider, PaymentSelection};
pub use pricing::{
    PriceBreakdown, PricingPolicy, QuoteRequest, DEFAULT_FLAT_SHIPPING, DEFAULT_HOME_REGION,
    DEFAULT_TAX_BPS,
};
