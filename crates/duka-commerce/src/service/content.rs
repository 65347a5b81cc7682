//! Business content reads and admin edits.

use crate::clock::Clock;
use crate::content::{ContactInfo, FaqEntry, FaqInput, SiteSettings};
use crate::error::CommerceError;
use crate::ids::FaqId;
use crate::repository::ContentRepository;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct ContentService {
    content: Arc<dyn ContentRepository>,
    clock: Arc<dyn Clock>,
    default_settings: SiteSettings,
}

impl ContentService {
    pub fn new(content: Arc<dyn ContentRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            content,
            clock,
            default_settings: SiteSettings::default(),
        }
    }

    /// Settings returned until an admin saves some.
    pub fn with_default_settings(mut self, settings: SiteSettings) -> Self {
        self.default_settings = settings;
        self
    }

    pub async fn contact_info(&self) -> Result<ContactInfo, CommerceError> {
        self.content
            .contact_info()
            .await?
            .ok_or_else(|| CommerceError::NotFound("Contact info".to_string()))
    }

    pub async fn put_contact_info(&self, info: ContactInfo) -> Result<ContactInfo, CommerceError> {
        info.validate()?;
        self.content.put_contact_info(&info).await?;
        info!("contact info updated");
        Ok(info)
    }

    /// Published entries for the public FAQ page.
    pub async fn faqs(&self) -> Result<Vec<FaqEntry>, CommerceError> {
        self.content.list_faqs(false).await
    }

    pub async fn all_faqs(&self) -> Result<Vec<FaqEntry>, CommerceError> {
        self.content.list_faqs(true).await
    }

    pub async fn create_faq(&self, input: FaqInput) -> Result<FaqEntry, CommerceError> {
        input.validate()?;
        let entry = input.into_entry(FaqId::generate(), self.clock.now());
        self.content.upsert_faq(&entry).await?;
        Ok(entry)
    }

    pub async fn update_faq(&self, id: FaqId, input: FaqInput) -> Result<FaqEntry, CommerceError> {
        input.validate()?;
        if self.content.get_faq(id).await?.is_none() {
            return Err(CommerceError::NotFound(format!("FAQ {id}")));
        }
        let entry = input.into_entry(id, self.clock.now());
        self.content.upsert_faq(&entry).await?;
        Ok(entry)
    }

    pub async fn delete_faq(&self, id: FaqId) -> Result<(), CommerceError> {
        if !self.content.delete_faq(id).await? {
            return Err(CommerceError::NotFound(format!("FAQ {id}")));
        }
        Ok(())
    }

    pub async fn settings(&self) -> Result<SiteSettings, CommerceError> {
        Ok(self
            .content
            .settings()
            .await?
            .unwrap_or_else(|| self.default_settings.clone()))
    }

    pub async fn put_settings(&self, settings: SiteSettings) -> Result<SiteSettings, CommerceError> {
        settings.validate()?;
        self.content.put_settings(&settings).await?;
        info!(
            free_shipping_region = %settings.free_shipping_region,
            tax_bps = settings.tax_bps,
            "site settings updated"
        );
        Ok(settings)
    }
}
