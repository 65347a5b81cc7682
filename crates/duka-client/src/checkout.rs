//! Checkout session driving the wizard and submitting the order.

use crate::{CartStore, ClientError, OrderApi};
use duka_commerce::cart::CartOwner;
use duka_commerce::checkout::{
    CheckoutStep, CheckoutWizard, CreateOrder, OrderConfirmation, OrderLineInput, PriceBreakdown,
    PricingPolicy,
};
use duka_commerce::validation::FieldErrors;
use std::sync::Arc;
use tracing::{info, warn};

/// Wizard plus submission state.
pub struct CheckoutSession {
    api: Arc<dyn OrderApi>,
    policy: PricingPolicy,
    owner: Option<CartOwner>,
    pub wizard: CheckoutWizard,
    field_errors: FieldErrors,
    error: Option<String>,
    submitting: bool,
    confirmation: Option<OrderConfirmation>,
}

impl CheckoutSession {
    pub fn new(api: Arc<dyn OrderApi>) -> Self {
        Self {
            api,
            policy: PricingPolicy::default(),
            owner: None,
            wizard: CheckoutWizard::new(),
            field_errors: FieldErrors::new(),
            error: None,
            submitting: false,
            confirmation: None,
        }
    }

    /// Pricing rules used for the local breakdown.
    pub fn with_policy(mut self, policy: PricingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Owner reference sent along with the order.
    pub fn with_owner(mut self, owner: CartOwner) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn step(&self) -> CheckoutStep {
        self.wizard.step()
    }

    /// Messages from the last rejected "next" or submission.
    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn confirmation(&self) -> Option<&OrderConfirmation> {
        self.confirmation.as_ref()
    }

    /// Advance if the current step's gate passes; otherwise keep the step
    /// and expose the field messages.
    pub fn next(&mut self) -> bool {
        match self.wizard.validate_step(self.wizard.step()) {
            Ok(()) => {
                self.field_errors = FieldErrors::new();
                self.wizard.next().is_ok()
            }
            Err(errors) => {
                self.field_errors = errors;
                false
            }
        }
    }

    pub fn back(&mut self) -> bool {
        self.field_errors = FieldErrors::new();
        self.wizard.back().is_ok()
    }

    /// Breakdown for the cart as it stands, using the contact region.
    pub fn pricing(&self, cart: &CartStore) -> Result<PriceBreakdown, ClientError> {
        Ok(self.policy.quote(&cart.summary(), &self.wizard.contact.region)?)
    }

    /// Submit from Review. On success the local cart is emptied (the server
    /// has already cleared its copy) and the confirmation is kept. On failure
    /// the session stays on Review with the error recorded.
    pub async fn submit(&mut self, cart: &CartStore) -> Result<OrderConfirmation, ClientError> {
        self.error = None;
        let result = self.try_submit(cart).await;
        self.submitting = false;
        match &result {
            Ok(confirmation) => {
                info!(order_number = %confirmation.order_number, "order placed");
                cart.sync(Vec::new());
                self.confirmation = Some(confirmation.clone());
            }
            Err(e) => {
                warn!(error = %e, "order submission failed");
                if let Some(fields) = e.fields() {
                    self.field_errors = fields.clone();
                }
                self.error = Some(e.user_message());
            }
        }
        result
    }

    async fn try_submit(&mut self, cart: &CartStore) -> Result<OrderConfirmation, ClientError> {
        let checkout = self.wizard.details()?;
        let items = cart
            .items()
            .into_iter()
            .map(|item| OrderLineInput {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
                attributes: item.attributes,
            })
            .collect();
        let pricing = self.pricing(cart)?;
        let request = CreateOrder {
            checkout,
            items,
            pricing: Some(pricing),
            owner: self.owner.clone(),
        };
        self.submitting = true;
        self.api.create_order(&request).await
    }
}
