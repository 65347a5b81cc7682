//! Contact and delivery address forms.

use crate::validation::{is_valid_email, is_valid_phone, FieldErrors};
use serde::{Deserialize, Serialize};

/// Maximum length of free-text delivery instructions.
pub const MAX_INSTRUCTIONS_LEN: usize = 500;

/// Who to contact about the order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactDetails {
    pub full_name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Region of the country; drives the shipping fee.
    pub region: String,
}

impl ContactDetails {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(self.full_name.trim().is_empty(), "full_name", "Full name is required");
        if self.phone.trim().is_empty() {
            errors.add("phone", "Phone number is required");
        } else {
            errors.check(
                !is_valid_phone(&self.phone),
                "phone",
                "Enter a valid phone number",
            );
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            errors.check(!is_valid_email(email), "email", "Enter a valid email address");
        }
        errors.check(self.region.trim().is_empty(), "region", "Region is required");
        errors.into_result()
    }

    /// Email, if one was given and is non-blank.
    pub fn email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

/// Street address for direct delivery.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryAddress {
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub instructions: Option<String>,
}

impl DeliveryAddress {
    pub fn new(address: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            city: city.into(),
            instructions: None,
        }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(
            self.address.trim().chars().count() < 5,
            "address",
            "Address must be at least 5 characters",
        );
        errors.check(
            self.city.trim().chars().count() < 2,
            "city",
            "City must be at least 2 characters",
        );
        errors.extend(validate_instructions(self.instructions.as_deref()));
        errors.into_result()
    }

    /// Format as single line.
    pub fn one_line(&self) -> String {
        format!("{}, {}", self.address.trim(), self.city.trim())
    }
}

/// Instructions are optional but bounded.
pub fn validate_instructions(instructions: Option<&str>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(text) = instructions {
        errors.check(
            text.chars().count() > MAX_INSTRUCTIONS_LEN,
            "instructions",
            "Delivery instructions must be 500 characters or fewer",
        );
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ContactDetails {
        ContactDetails {
            full_name: "Amina Juma".to_string(),
            phone: "+255712345678".to_string(),
            email: None,
            region: "Arusha".to_string(),
        }
    }

    #[test]
    fn test_contact_requires_phone_and_region() {
        assert!(contact().validate().is_ok());

        let mut c = contact();
        c.phone = String::new();
        c.region = "  ".to_string();
        let errors = c.validate().unwrap_err();
        assert_eq!(errors.get("phone"), Some("Phone number is required"));
        assert!(errors.contains("region"));
    }

    #[test]
    fn test_contact_rejects_malformed_values() {
        let mut c = contact();
        c.phone = "12ab".to_string();
        c.email = Some("not-an-email".to_string());
        let errors = c.validate().unwrap_err();
        assert_eq!(errors.get("phone"), Some("Enter a valid phone number"));
        assert!(errors.contains("email"));
    }

    #[test]
    fn test_blank_email_is_ignored() {
        let mut c = contact();
        c.email = Some("   ".to_string());
        assert!(c.validate().is_ok());
        assert_eq!(c.email(), None);
    }

    #[test]
    fn test_address_minimum_lengths() {
        assert!(DeliveryAddress::new("Plot 12, Mikocheni", "Dar").validate().is_ok());

        let errors = DeliveryAddress::new("Plot", "D").validate().unwrap_err();
        assert!(errors.contains("address"));
        assert!(errors.contains("city"));
    }

    #[test]
    fn test_instructions_length() {
        let mut addr = DeliveryAddress::new("Plot 12, Mikocheni", "Dar");
        addr.instructions = Some("x".repeat(MAX_INSTRUCTIONS_LEN));
        assert!(addr.validate().is_ok());
        addr.instructions = Some("x".repeat(MAX_INSTRUCTIONS_LEN + 1));
        assert!(addr.validate().unwrap_err().contains("instructions"));
    }
}
