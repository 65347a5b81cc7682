//! Delivery method and payment selection.

use crate::validation::{is_valid_phone, FieldErrors};
use serde::{Deserialize, Serialize};

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Courier to the customer's address.
    DirectDelivery,
    /// Customer collects from a pickup agent.
    AgentPickup,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::DirectDelivery => "direct_delivery",
            DeliveryMethod::AgentPickup => "agent_pickup",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "direct_delivery" => Some(DeliveryMethod::DirectDelivery),
            "agent_pickup" => Some(DeliveryMethod::AgentPickup),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DeliveryMethod::DirectDelivery => "Direct delivery",
            DeliveryMethod::AgentPickup => "Agent pickup",
        }
    }

    /// Whether the address step must be filled in.
    pub fn requires_address(&self) -> bool {
        matches!(self, DeliveryMethod::DirectDelivery)
    }
}

/// Mobile money networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MobileMoneyProvider {
    Mpesa,
    TigoPesa,
    AirtelMoney,
    HaloPesa,
}

impl MobileMoneyProvider {
    pub fn display_name(&self) -> &'static str {
        match self {
            MobileMoneyProvider::Mpesa => "M-Pesa",
            MobileMoneyProvider::TigoPesa => "Tigo Pesa",
            MobileMoneyProvider::AirtelMoney => "Airtel Money",
            MobileMoneyProvider::HaloPesa => "HaloPesa",
        }
    }
}

/// How the customer intends to pay. Only the choice is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentSelection {
    MobileMoney {
        provider: MobileMoneyProvider,
        payer_phone: String,
    },
    CashOnDelivery,
    BankTransfer,
}

impl PaymentSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentSelection::MobileMoney { .. } => "mobile_money",
            PaymentSelection::CashOnDelivery => "cash_on_delivery",
            PaymentSelection::BankTransfer => "bank_transfer",
        }
    }

    /// Human-readable label for receipts and emails.
    pub fn display_name(&self) -> String {
        match self {
            PaymentSelection::MobileMoney { provider, .. } => {
                format!("Mobile money ({})", provider.display_name())
            }
            PaymentSelection::CashOnDelivery => "Cash on delivery".to_string(),
            PaymentSelection::BankTransfer => "Bank transfer".to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let PaymentSelection::MobileMoney { payer_phone, .. } = self {
            if payer_phone.trim().is_empty() {
                errors.add("payer_phone", "Mobile money number is required");
            } else {
                errors.check(
                    !is_valid_phone(payer_phone),
                    "payer_phone",
                    "Enter a valid mobile money number",
                );
            }
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_money_needs_phone() {
        let selection = PaymentSelection::MobileMoney {
            provider: MobileMoneyProvider::Mpesa,
            payer_phone: String::new(),
        };
        assert!(selection.validate().unwrap_err().contains("payer_phone"));

        let selection = PaymentSelection::MobileMoney {
            provider: MobileMoneyProvider::Mpesa,
            payer_phone: "0754 000 111".to_string(),
        };
        assert!(selection.validate().is_ok());
        assert_eq!(selection.display_name(), "Mobile money (M-Pesa)");
    }

    #[test]
    fn test_other_methods_always_valid() {
        assert!(PaymentSelection::CashOnDelivery.validate().is_ok());
        assert!(PaymentSelection::BankTransfer.validate().is_ok());
    }

    #[test]
    fn test_payment_serde_shape() {
        let json = serde_json::json!({
            "method": "mobile_money",
            "provider": "tigo_pesa",
            "payer_phone": "0715000000"
        });
        let selection: PaymentSelection = serde_json::from_value(json).unwrap();
        assert_eq!(selection.as_str(), "mobile_money");

        let cod: PaymentSelection =
            serde_json::from_value(serde_json::json!({"method": "cash_on_delivery"})).unwrap();
        assert_eq!(cod, PaymentSelection::CashOnDelivery);
    }

    #[test]
    fn test_delivery_requires_address() {
        assert!(DeliveryMethod::DirectDelivery.requires_address());
        assert!(!DeliveryMethod::AgentPickup.requires_address());
    }
}
