//! Checkout wizard state machine.
//!
//! Five steps walked strictly in order. `next` only moves forward when the
//! current step's gate passes; `back` moves one step toward the start.

use crate::checkout::{
    validate_instructions, ContactDetails, DeliveryAddress, DeliveryMethod, PaymentSelection,
};
use crate::error::CommerceError;
use crate::validation::FieldErrors;
use serde::{Deserialize, Serialize};

/// Steps in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Name, phone, email, region.
    Contact,
    /// Delivery method.
    Delivery,
    /// Street address (direct delivery only).
    Address,
    /// Payment selection.
    Payment,
    /// Order review before submission.
    Review,
}

impl CheckoutStep {
    pub const ALL: [CheckoutStep; 5] = [
        CheckoutStep::Contact,
        CheckoutStep::Delivery,
        CheckoutStep::Address,
        CheckoutStep::Payment,
        CheckoutStep::Review,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Contact => "contact",
            CheckoutStep::Delivery => "delivery",
            CheckoutStep::Address => "address",
            CheckoutStep::Payment => "payment",
            CheckoutStep::Review => "review",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CheckoutStep::Contact => "Contact",
            CheckoutStep::Delivery => "Delivery",
            CheckoutStep::Address => "Address",
            CheckoutStep::Payment => "Payment",
            CheckoutStep::Review => "Review",
        }
    }

    /// Get the step number (1-indexed).
    pub fn number(&self) -> u8 {
        match self {
            CheckoutStep::Contact => 1,
            CheckoutStep::Delivery => 2,
            CheckoutStep::Address => 3,
            CheckoutStep::Payment => 4,
            CheckoutStep::Review => 5,
        }
    }

    pub fn next(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Contact => Some(CheckoutStep::Delivery),
            CheckoutStep::Delivery => Some(CheckoutStep::Address),
            CheckoutStep::Address => Some(CheckoutStep::Payment),
            CheckoutStep::Payment => Some(CheckoutStep::Review),
            CheckoutStep::Review => None,
        }
    }

    pub fn previous(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Contact => None,
            CheckoutStep::Delivery => Some(CheckoutStep::Contact),
            CheckoutStep::Address => Some(CheckoutStep::Delivery),
            CheckoutStep::Payment => Some(CheckoutStep::Address),
            CheckoutStep::Review => Some(CheckoutStep::Payment),
        }
    }
}

/// Everything the wizard collected, validated and ready to submit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub contact: ContactDetails,
    pub delivery_method: DeliveryMethod,
    /// Present only for direct delivery.
    pub address: Option<DeliveryAddress>,
    pub payment: PaymentSelection,
}

impl CheckoutDetails {
    /// Run every gate at once.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Err(e) = self.contact.validate() {
            errors.extend(e);
        }
        match (&self.address, self.delivery_method.requires_address()) {
            (Some(address), true) => {
                if let Err(e) = address.validate() {
                    errors.extend(e);
                }
            }
            (None, true) => errors.add("address", "Address is required for delivery"),
            (Some(address), false) => {
                errors.extend(validate_instructions(address.instructions.as_deref()))
            }
            (None, false) => {}
        }
        if let Err(e) = self.payment.validate() {
            errors.extend(e);
        }
        errors.into_result()
    }
}

/// Checkout wizard state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutWizard {
    /// Current step.
    step: CheckoutStep,
    pub contact: ContactDetails,
    pub delivery_method: Option<DeliveryMethod>,
    pub address: DeliveryAddress,
    pub payment: Option<PaymentSelection>,
}

impl Default for CheckoutWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutWizard {
    /// Create a wizard on the first step.
    pub fn new() -> Self {
        Self {
            step: CheckoutStep::Contact,
            contact: ContactDetails::default(),
            delivery_method: None,
            address: DeliveryAddress::default(),
            payment: None,
        }
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn set_contact(&mut self, contact: ContactDetails) {
        self.contact = contact;
    }

    pub fn set_delivery_method(&mut self, method: DeliveryMethod) {
        self.delivery_method = Some(method);
    }

    pub fn set_address(&mut self, address: DeliveryAddress) {
        self.address = address;
    }

    pub fn set_payment(&mut self, payment: PaymentSelection) {
        self.payment = Some(payment);
    }

    /// Check one step's gate.
    pub fn validate_step(&self, step: CheckoutStep) -> Result<(), FieldErrors> {
        match step {
            CheckoutStep::Contact => self.contact.validate(),
            CheckoutStep::Delivery => {
                let mut errors = FieldErrors::new();
                errors.check(
                    self.delivery_method.is_none(),
                    "delivery_method",
                    "Choose a delivery method",
                );
                errors.into_result()
            }
            CheckoutStep::Address => match self.delivery_method {
                Some(method) if method.requires_address() => self.address.validate(),
                _ => validate_instructions(self.address.instructions.as_deref()).into_result(),
            },
            CheckoutStep::Payment => match &self.payment {
                Some(payment) => payment.validate(),
                None => {
                    let mut errors = FieldErrors::new();
                    errors.add("payment", "Choose a payment method");
                    errors.into_result()
                }
            },
            CheckoutStep::Review => Ok(()),
        }
    }

    /// Advance to the next step when the current gate passes.
    pub fn next(&mut self) -> Result<CheckoutStep, CommerceError> {
        let Some(next) = self.step.next() else {
            return Err(CommerceError::InvalidCheckoutTransition {
                from: self.step.as_str().to_string(),
                to: "none".to_string(),
            });
        };
        self.validate_step(self.step)?;
        self.step = next;
        Ok(next)
    }

    /// Go back one step.
    pub fn back(&mut self) -> Result<CheckoutStep, CommerceError> {
        let Some(prev) = self.step.previous() else {
            return Err(CommerceError::InvalidCheckoutTransition {
                from: self.step.as_str().to_string(),
                to: "none".to_string(),
            });
        };
        self.step = prev;
        Ok(prev)
    }

    /// Whether submission is allowed: on Review with every gate passing.
    pub fn can_submit(&self) -> bool {
        self.step == CheckoutStep::Review
            && CheckoutStep::ALL
                .iter()
                .all(|step| self.validate_step(*step).is_ok())
    }

    /// Collected data for the order payload. Only available on Review.
    pub fn details(&self) -> Result<CheckoutDetails, CommerceError> {
        if self.step != CheckoutStep::Review {
            return Err(CommerceError::InvalidCheckoutTransition {
                from: self.step.as_str().to_string(),
                to: "submit".to_string(),
            });
        }
        let (Some(delivery_method), Some(payment)) = (self.delivery_method, self.payment.clone())
        else {
            return Err(CommerceError::invalid("payment", "Choose a payment method"));
        };
        let address = if delivery_method.requires_address() {
            Some(self.address.clone())
        } else {
            None
        };
        let details = CheckoutDetails {
            contact: self.contact.clone(),
            delivery_method,
            address,
            payment,
        };
        details.validate()?;
        Ok(details)
    }

    /// Get progress percentage.
    pub fn progress_percent(&self) -> u8 {
        self.step.number() * 20
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::MobileMoneyProvider;

    fn contact() -> ContactDetails {
        ContactDetails {
            full_name: "Baraka Mushi".to_string(),
            phone: "0712345678".to_string(),
            email: Some("baraka@example.com".to_string()),
            region: "Dar es Salaam".to_string(),
        }
    }

    fn at_review(method: DeliveryMethod) -> CheckoutWizard {
        let mut wizard = CheckoutWizard::new();
        wizard.set_contact(contact());
        wizard.next().unwrap();
        wizard.set_delivery_method(method);
        wizard.next().unwrap();
        if method.requires_address() {
            wizard.set_address(DeliveryAddress::new("Plot 5, Msasani", "Dar es Salaam"));
        }
        wizard.next().unwrap();
        wizard.set_payment(PaymentSelection::CashOnDelivery);
        wizard.next().unwrap();
        wizard
    }

    #[test]
    fn test_starts_on_contact() {
        let wizard = CheckoutWizard::new();
        assert_eq!(wizard.step(), CheckoutStep::Contact);
        assert_eq!(wizard.progress_percent(), 20);
    }

    #[test]
    fn test_contact_gate_blocks_without_phone_and_region() {
        let mut wizard = CheckoutWizard::new();
        wizard.set_contact(ContactDetails {
            full_name: "Baraka".to_string(),
            ..ContactDetails::default()
        });
        match wizard.next() {
            Err(CommerceError::Validation(errors)) => {
                assert!(errors.contains("phone"));
                assert!(errors.contains("region"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(wizard.step(), CheckoutStep::Contact);
    }

    #[test]
    fn test_delivery_gate() {
        let mut wizard = CheckoutWizard::new();
        wizard.set_contact(contact());
        wizard.next().unwrap();
        assert!(wizard.next().is_err());
        wizard.set_delivery_method(DeliveryMethod::AgentPickup);
        assert_eq!(wizard.next().unwrap(), CheckoutStep::Address);
    }

    #[test]
    fn test_address_gate_under_direct_delivery() {
        let mut wizard = CheckoutWizard::new();
        wizard.set_contact(contact());
        wizard.next().unwrap();
        wizard.set_delivery_method(DeliveryMethod::DirectDelivery);
        wizard.next().unwrap();

        wizard.set_address(DeliveryAddress::new("Plot", "D"));
        assert!(wizard.next().is_err());
        assert_eq!(wizard.step(), CheckoutStep::Address);

        wizard.set_address(DeliveryAddress::new("Plot 5, Msasani", "Dar"));
        assert_eq!(wizard.next().unwrap(), CheckoutStep::Payment);
    }

    #[test]
    fn test_agent_pickup_skips_address_checks() {
        let wizard = at_review(DeliveryMethod::AgentPickup);
        assert_eq!(wizard.step(), CheckoutStep::Review);
        let details = wizard.details().unwrap();
        assert!(details.address.is_none());
    }

    #[test]
    fn test_payment_gate() {
        let mut wizard = at_review(DeliveryMethod::AgentPickup);
        wizard.back().unwrap();
        wizard.set_payment(PaymentSelection::MobileMoney {
            provider: MobileMoneyProvider::AirtelMoney,
            payer_phone: String::new(),
        });
        assert!(wizard.next().is_err());
        wizard.payment = None;
        assert!(wizard.next().is_err());
    }

    #[test]
    fn test_back_not_allowed_from_first_step() {
        let mut wizard = CheckoutWizard::new();
        assert!(matches!(
            wizard.back(),
            Err(CommerceError::InvalidCheckoutTransition { .. })
        ));
    }

    #[test]
    fn test_back_moves_one_step() {
        let mut wizard = at_review(DeliveryMethod::DirectDelivery);
        assert_eq!(wizard.back().unwrap(), CheckoutStep::Payment);
        assert_eq!(wizard.back().unwrap(), CheckoutStep::Address);
    }

    #[test]
    fn test_review_is_terminal() {
        let mut wizard = at_review(DeliveryMethod::DirectDelivery);
        assert!(wizard.can_submit());
        assert!(wizard.next().is_err());
        let details = wizard.details().unwrap();
        assert_eq!(details.address.unwrap().city, "Dar es Salaam");
    }

    #[test]
    fn test_details_only_on_review() {
        let wizard = CheckoutWizard::new();
        assert!(wizard.details().is_err());
        assert!(!wizard.can_submit());
    }
}
