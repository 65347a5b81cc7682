//! Order placement and administration.

use crate::cart::CartOwner;
use crate::catalog::Page;
use crate::checkout::{
    CreateOrder, Order, OrderStatusUpdate, PriceBreakdown, PricingPolicy,
};
use crate::clock::Clock;
use crate::error::CommerceError;
use crate::ids::OrderId;
use crate::repository::{ContentRepository, OrderRepository};
use crate::service::CartService;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Checkout use cases: quoting, placing, and managing orders.
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    content: Arc<dyn ContentRepository>,
    carts: CartService,
    clock: Arc<dyn Clock>,
    fallback_policy: PricingPolicy,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        content: Arc<dyn ContentRepository>,
        carts: CartService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders,
            content,
            carts,
            clock,
            fallback_policy: PricingPolicy::default(),
        }
    }

    /// Policy used until site settings have been saved.
    pub fn with_fallback_policy(mut self, policy: PricingPolicy) -> Self {
        self.fallback_policy = policy;
        self
    }

    /// The pricing policy in force: site settings, else the fallback.
    pub async fn policy(&self) -> Result<PricingPolicy, CommerceError> {
        Ok(self
            .content
            .settings()
            .await?
            .map(|s| s.pricing_policy())
            .unwrap_or_else(|| self.fallback_policy.clone()))
    }

    /// Price the owner's cart for delivery to `region`.
    #[instrument(skip_all, fields(owner = %owner))]
    pub async fn quote(&self, owner: &CartOwner, region: &str) -> Result<PriceBreakdown, CommerceError> {
        let cart = self.carts.get(owner).await?;
        let summary = cart.summary()?;
        self.policy().await?.quote(&summary, region)
    }

    /// Create an order from the owner's persisted cart, then clear the cart.
    #[instrument(skip_all, fields(owner = %owner))]
    pub async fn place(&self, owner: &CartOwner, request: CreateOrder) -> Result<Order, CommerceError> {
        request.checkout.validate()?;
        if let Some(claimed) = &request.owner {
            if claimed != owner {
                warn!(claimed = %claimed, "order payload owner differs from session owner");
            }
        }

        let cart = self.carts.get(owner).await?;
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        let summary = cart.summary()?;
        let pricing = self
            .policy()
            .await?
            .quote(&summary, &request.checkout.contact.region)?;
        if let Some(client_pricing) = request.pricing {
            if client_pricing.total != pricing.total {
                warn!(
                    client_total = client_pricing.total.amount,
                    server_total = pricing.total.amount,
                    "client pricing differs from server pricing"
                );
            }
        }

        let order = Order::from_cart(&cart, request.checkout, pricing, self.clock.now())?;
        self.orders.create(&order).await?;
        self.carts.clear(owner).await?;
        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = order.pricing.total.amount,
            "order placed"
        );
        Ok(order)
    }

    /// An order visible to `owner`. Orders of other owners read as missing.
    pub async fn get_for(&self, owner: &CartOwner, id: OrderId) -> Result<Order, CommerceError> {
        let order = self.get(id).await?;
        if !order.is_owned_by(owner) {
            return Err(CommerceError::OrderNotFound(id.to_string()));
        }
        Ok(order)
    }

    pub async fn get(&self, id: OrderId) -> Result<Order, CommerceError> {
        self.orders
            .get(id)
            .await?
            .ok_or_else(|| CommerceError::OrderNotFound(id.to_string()))
    }

    pub async fn get_by_number(&self, order_number: &str) -> Result<Order, CommerceError> {
        self.orders
            .get_by_number(order_number)
            .await?
            .ok_or_else(|| CommerceError::OrderNotFound(order_number.to_string()))
    }

    pub async fn list(&self, page: i64, per_page: i64) -> Result<Page<Order>, CommerceError> {
        self.orders
            .list(page.max(1), per_page.clamp(1, crate::catalog::MAX_PER_PAGE))
            .await
    }

    /// Apply an admin status change.
    #[instrument(skip_all, fields(order_id = %id))]
    pub async fn update_status(
        &self,
        id: OrderId,
        update: OrderStatusUpdate,
    ) -> Result<Order, CommerceError> {
        let mut order = self.get(id).await?;
        let now = self.clock.now();
        if let Some(status) = update.status {
            order.transition(status, now)?;
        }
        if let Some(payment_status) = update.payment_status {
            order.set_payment_status(payment_status, now);
        }
        self.orders.update(&order).await?;
        info!(
            order_number = %order.order_number,
            status = order.status.as_str(),
            payment_status = order.payment_status.as_str(),
            "order updated"
        );
        Ok(order)
    }

    /// Record a generated invoice on the order.
    pub async fn set_invoice(
        &self,
        id: OrderId,
        url: &str,
        verification_code: &str,
    ) -> Result<Order, CommerceError> {
        let mut order = self.get(id).await?;
        order.set_invoice(url, verification_code, self.clock.now());
        self.orders.update(&order).await?;
        Ok(order)
    }
}
