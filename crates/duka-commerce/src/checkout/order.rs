//! Order types.

use crate::cart::{AttributeSelection, Cart, CartOwner};
use crate::checkout::{
    CheckoutDetails, ContactDetails, DeliveryAddress, DeliveryMethod, PaymentSelection,
    PriceBreakdown,
};
use crate::error::CommerceError;
use crate::ids::{OrderId, OrderItemId, ProductId};
use crate::money::Money;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

const ORDER_NUMBER_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const ORDER_NUMBER_SUFFIX_LEN: usize = 6;

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, awaiting processing.
    #[default]
    Pending,
    /// Order confirmed by the shop.
    Confirmed,
    /// Order being prepared.
    Processing,
    /// Order handed to the courier or agent.
    Shipped,
    /// Order delivered.
    Delivered,
    /// Order cancelled.
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "processing" => Some(OrderStatus::Processing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Check if order can be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Processing
        )
    }

    /// Forward-only lifecycle, with cancellation before shipping.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if next == OrderStatus::Cancelled {
            return self.can_cancel();
        }
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Confirmed)
                | (OrderStatus::Pending, OrderStatus::Processing)
                | (OrderStatus::Confirmed, OrderStatus::Processing)
                | (OrderStatus::Processing, OrderStatus::Shipped)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
        )
    }
}

/// Payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment pending.
    #[default]
    Pending,
    /// Payment received.
    Paid,
    /// Fully refunded.
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Human-readable order number, `ORD-YYYYMMDD-XXXXXX`.
    pub order_number: String,
    /// User or guest session that placed the order.
    pub owner: CartOwner,
    pub contact: ContactDetails,
    pub delivery_method: DeliveryMethod,
    pub address: Option<DeliveryAddress>,
    pub payment: PaymentSelection,
    pub pricing: PriceBreakdown,
    /// Items in the order.
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Public URL of the generated invoice.
    pub invoice_url: Option<String>,
    /// Code printed on the invoice for authenticity checks.
    pub verification_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Generate a new order number.
    pub fn generate_order_number(now: DateTime<Utc>) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ORDER_NUMBER_SUFFIX_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..ORDER_NUMBER_ALPHABET.len());
                ORDER_NUMBER_ALPHABET[idx] as char
            })
            .collect();
        format!("ORD-{}-{}", now.format("%Y%m%d"), suffix)
    }

    /// Build an order from a cart, capturing each line's unit price.
    pub fn from_cart(
        cart: &Cart,
        details: CheckoutDetails,
        pricing: PriceBreakdown,
        now: DateTime<Utc>,
    ) -> Result<Self, CommerceError> {
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        let items = cart
            .items
            .iter()
            .map(|item| {
                Ok(OrderItem {
                    id: OrderItemId::generate(),
                    product_id: item.product_id,
                    product_name: item.product.name.clone(),
                    attributes: item.attributes.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    line_total: item.line_total()?,
                })
            })
            .collect::<Result<Vec<_>, CommerceError>>()?;

        Ok(Self {
            id: OrderId::generate(),
            order_number: Self::generate_order_number(now),
            owner: cart.owner.clone(),
            contact: details.contact,
            delivery_method: details.delivery_method,
            address: details.address,
            payment: details.payment,
            pricing,
            items,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            invoice_url: None,
            verification_code: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get total item count.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Whether `owner` may see this order.
    pub fn is_owned_by(&self, owner: &CartOwner) -> bool {
        self.owner == *owner
    }

    /// Move to a new status, rejecting backward moves.
    pub fn transition(&mut self, next: OrderStatus, now: DateTime<Utc>) -> Result<(), CommerceError> {
        if next == self.status {
            return Ok(());
        }
        if !self.status.can_transition_to(next) {
            return Err(CommerceError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Update payment status.
    pub fn set_payment_status(&mut self, status: PaymentStatus, now: DateTime<Utc>) {
        self.payment_status = status;
        self.updated_at = now;
    }

    /// Record a generated invoice.
    pub fn set_invoice(&mut self, url: impl Into<String>, code: impl Into<String>, now: DateTime<Utc>) {
        self.invoice_url = Some(url.into());
        self.verification_code = Some(code.into());
        self.updated_at = now;
    }
}

/// A line item in an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Unique line item identifier.
    pub id: OrderItemId,
    /// Product ID.
    pub product_id: ProductId,
    /// Product name at time of order.
    pub product_name: String,
    #[serde(default)]
    pub attributes: AttributeSelection,
    /// Quantity ordered.
    pub quantity: i64,
    /// Unit price at time of order.
    pub unit_price: Money,
    /// Total price for this line.
    pub line_total: Money,
}

impl OrderItem {
    /// "Color: red, Size: M" style label; empty when nothing was selected.
    pub fn attribute_label(&self) -> String {
        self.attributes
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A line as the client submits it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLineInput {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
    #[serde(default)]
    pub attributes: AttributeSelection,
}

/// Order creation payload.
///
/// The server trusts only `checkout`; lines and pricing are recomputed from
/// the persisted cart and compared for logging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateOrder {
    pub checkout: CheckoutDetails,
    #[serde(default)]
    pub items: Vec<OrderLineInput>,
    #[serde(default)]
    pub pricing: Option<PriceBreakdown>,
    /// Owner as the client believes it to be.
    #[serde(default)]
    pub owner: Option<CartOwner>,
}

/// What the client gets back after a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub order_number: String,
}

impl From<&Order> for OrderConfirmation {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            order_number: order.order_number.clone(),
        }
    }
}

/// Admin status change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderStatusUpdate {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}
