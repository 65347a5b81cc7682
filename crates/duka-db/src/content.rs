//! Contact info, site settings and FAQs.

use crate::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duka_commerce::content::{ContactInfo, FaqEntry, SiteSettings};
use duka_commerce::error::CommerceError;
use duka_commerce::ids::FaqId;
use duka_commerce::repository::ContentRepository;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

const CONTACT_DOCUMENT: &str = "contact";
const SETTINGS_DOCUMENT: &str = "settings";

#[derive(Debug, sqlx::FromRow)]
struct FaqRow {
    id: Uuid,
    question: String,
    answer: String,
    position: i32,
    published: bool,
    updated_at: DateTime<Utc>,
}

impl From<FaqRow> for FaqEntry {
    fn from(row: FaqRow) -> Self {
        FaqEntry {
            id: FaqId::from_uuid(row.id),
            question: row.question,
            answer: row.answer,
            position: row.position,
            published: row.published,
            updated_at: row.updated_at,
        }
    }
}

/// Content repository on Postgres.
///
/// Contact info and settings are single JSON documents keyed by name.
#[derive(Debug, Clone)]
pub struct PgContent {
    pool: PgPool,
}

impl PgContent {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn document<T: DeserializeOwned + Send + Unpin + 'static>(
        &self,
        name: &str,
    ) -> Result<Option<T>, DbError> {
        let body: Option<Json<T>> =
            sqlx::query_scalar("SELECT body FROM site_documents WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(body.map(|b| b.0))
    }

    async fn put_document<T: Serialize + Sync>(&self, name: &str, body: &T) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO site_documents (name, body, updated_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT (name) DO UPDATE SET body = EXCLUDED.body, updated_at = NOW()",
        )
        .bind(name)
        .bind(Json(body))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ContentRepository for PgContent {
    async fn contact_info(&self) -> Result<Option<ContactInfo>, CommerceError> {
        Ok(self.document(CONTACT_DOCUMENT).await?)
    }

    async fn put_contact_info(&self, info: &ContactInfo) -> Result<(), CommerceError> {
        Ok(self.put_document(CONTACT_DOCUMENT, info).await?)
    }

    async fn list_faqs(&self, include_unpublished: bool) -> Result<Vec<FaqEntry>, CommerceError> {
        let rows = sqlx::query_as::<_, FaqRow>(
            "SELECT id, question, answer, position, published, updated_at FROM faqs \
             WHERE published OR $1 ORDER BY position, question",
        )
        .bind(include_unpublished)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(rows.into_iter().map(FaqEntry::from).collect())
    }

    async fn get_faq(&self, id: FaqId) -> Result<Option<FaqEntry>, CommerceError> {
        let row = sqlx::query_as::<_, FaqRow>(
            "SELECT id, question, answer, position, published, updated_at FROM faqs WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(row.map(FaqEntry::from))
    }

    async fn upsert_faq(&self, entry: &FaqEntry) -> Result<(), CommerceError> {
        sqlx::query(
            "INSERT INTO faqs (id, question, answer, position, published, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (id) DO UPDATE SET \
                 question = EXCLUDED.question, answer = EXCLUDED.answer, \
                 position = EXCLUDED.position, published = EXCLUDED.published, \
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(entry.id.as_uuid())
        .bind(&entry.question)
        .bind(&entry.answer)
        .bind(entry.position)
        .bind(entry.published)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(())
    }

    async fn delete_faq(&self, id: FaqId) -> Result<bool, CommerceError> {
        let result = sqlx::query("DELETE FROM faqs WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn settings(&self) -> Result<Option<SiteSettings>, CommerceError> {
        Ok(self.document(SETTINGS_DOCUMENT).await?)
    }

    async fn put_settings(&self, settings: &SiteSettings) -> Result<(), CommerceError> {
        Ok(self.put_document(SETTINGS_DOCUMENT, settings).await?)
    }
}
