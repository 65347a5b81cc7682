//! Business content edited from the admin area.

use crate::checkout::{PricingPolicy, DEFAULT_FLAT_SHIPPING, DEFAULT_HOME_REGION, DEFAULT_TAX_BPS};
use crate::ids::FaqId;
use crate::money::{Currency, Money};
use crate::validation::{is_valid_email, is_valid_phone, FieldErrors};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How customers reach the shop.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub whatsapp: Option<String>,
    pub address: String,
    /// Free text, e.g. "Mon-Sat 08:00-18:00".
    pub working_hours: String,
}

impl ContactInfo {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(!is_valid_phone(&self.phone), "phone", "Enter a valid phone number");
        errors.check(!is_valid_email(&self.email), "email", "Enter a valid email address");
        if let Some(whatsapp) = self.whatsapp.as_deref().filter(|w| !w.trim().is_empty()) {
            errors.check(
                !is_valid_phone(whatsapp),
                "whatsapp",
                "Enter a valid WhatsApp number",
            );
        }
        errors.check(self.address.trim().is_empty(), "address", "Address is required");
        errors.into_result()
    }
}

/// A frequently asked question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FaqEntry {
    pub id: FaqId,
    pub question: String,
    pub answer: String,
    /// Display order, ascending.
    pub position: i32,
    pub published: bool,
    pub updated_at: DateTime<Utc>,
}

/// Admin FAQ body for create and update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FaqInput {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "published_default")]
    pub published: bool,
}

fn published_default() -> bool {
    true
}

impl FaqInput {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(self.question.trim().is_empty(), "question", "Question is required");
        errors.check(self.answer.trim().is_empty(), "answer", "Answer is required");
        errors.into_result()
    }

    pub fn into_entry(self, id: FaqId, now: DateTime<Utc>) -> FaqEntry {
        FaqEntry {
            id,
            question: self.question.trim().to_string(),
            answer: self.answer.trim().to_string(),
            position: self.position,
            published: self.published,
            updated_at: now,
        }
    }
}

/// Store-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteSettings {
    pub store_name: String,
    pub currency: Currency,
    /// Region that ships free.
    pub free_shipping_region: String,
    /// Shipping fee everywhere else.
    pub flat_shipping_fee: Money,
    /// VAT in basis points.
    pub tax_bps: u32,
    /// Banner text shown across the top of the store.
    #[serde(default)]
    pub announcement: Option<String>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            store_name: "Duka".to_string(),
            currency: Currency::TZS,
            free_shipping_region: DEFAULT_HOME_REGION.to_string(),
            flat_shipping_fee: Money::tzs(DEFAULT_FLAT_SHIPPING),
            tax_bps: DEFAULT_TAX_BPS,
            announcement: None,
        }
    }
}

impl SiteSettings {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(self.store_name.trim().is_empty(), "store_name", "Store name is required");
        errors.check(
            self.free_shipping_region.trim().is_empty(),
            "free_shipping_region",
            "Free shipping region is required",
        );
        errors.check(
            self.flat_shipping_fee.is_negative(),
            "flat_shipping_fee",
            "Shipping fee cannot be negative",
        );
        errors.check(
            self.flat_shipping_fee.currency != self.currency,
            "flat_shipping_fee",
            "Shipping fee must use the store currency",
        );
        errors.check(self.tax_bps > 10_000, "tax_bps", "Tax rate cannot exceed 100%");
        errors.into_result()
    }

    /// The checkout pricing rules these settings describe.
    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy {
            home_region: self.free_shipping_region.clone(),
            flat_shipping: self.flat_shipping_fee,
            tax_bps: self.tax_bps,
        }
    }
}

/// A message sent through the contact form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SupportTicket {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl SupportTicket {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(self.name.trim().is_empty(), "name", "Name is required");
        errors.check(!is_valid_email(&self.email), "email", "Enter a valid email address");
        errors.check(self.subject.trim().is_empty(), "subject", "Subject is required");
        errors.check(
            self.message.trim().chars().count() < 10,
            "message",
            "Message must be at least 10 characters",
        );
        errors.check(
            self.message.chars().count() > 5_000,
            "message",
            "Message is too long",
        );
        errors.into_result()
    }

    /// Reference quoted back to the customer, e.g. `TKT-7Q2M9X`.
    pub fn generate_reference() -> String {
        const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
        let mut rng = rand::thread_rng();
        let suffix: String = (0..6)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        format!("TKT-{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_info_validation() {
        let info = ContactInfo {
            phone: "+255 700 000 000".to_string(),
            email: "hello@duka.co.tz".to_string(),
            whatsapp: Some("".to_string()),
            address: "Samora Ave, Dar es Salaam".to_string(),
            working_hours: "Mon-Sat 08:00-18:00".to_string(),
        };
        assert!(info.validate().is_ok());

        let bad = ContactInfo {
            email: "nope".to_string(),
            ..info
        };
        assert!(bad.validate().unwrap_err().contains("email"));
    }

    #[test]
    fn test_settings_drive_pricing() {
        let settings = SiteSettings {
            free_shipping_region: "Arusha".to_string(),
            flat_shipping_fee: Money::tzs(10_000),
            ..SiteSettings::default()
        };
        let policy = settings.pricing_policy();
        assert!(policy.shipping_for("arusha").is_zero());
        assert_eq!(policy.shipping_for("Dar es Salaam"), Money::tzs(10_000));
    }

    #[test]
    fn test_settings_validation() {
        assert!(SiteSettings::default().validate().is_ok());
        let bad = SiteSettings {
            tax_bps: 20_000,
            flat_shipping_fee: Money::tzs(-1),
            ..SiteSettings::default()
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.contains("tax_bps"));
        assert!(errors.contains("flat_shipping_fee"));
    }

    #[test]
    fn test_faq_input() {
        let input = FaqInput {
            question: " Do you deliver upcountry? ".to_string(),
            answer: "Yes, through pickup agents.".to_string(),
            position: 1,
            published: true,
        };
        assert!(input.validate().is_ok());
        let entry = input.into_entry(FaqId::generate(), Utc::now());
        assert_eq!(entry.question, "Do you deliver upcountry?");
    }

    #[test]
    fn test_support_ticket() {
        let ticket = SupportTicket {
            name: "Zawadi".to_string(),
            email: "zawadi@example.com".to_string(),
            subject: "Late delivery".to_string(),
            message: "My order has not arrived yet.".to_string(),
        };
        assert!(ticket.validate().is_ok());
        let reference = SupportTicket::generate_reference();
        assert!(reference.starts_with("TKT-"));
        assert_eq!(reference.len(), 10);
    }
}
