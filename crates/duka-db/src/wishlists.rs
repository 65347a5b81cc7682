//! Saved products per owner.

use crate::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duka_commerce::cart::CartOwner;
use duka_commerce::error::CommerceError;
use duka_commerce::ids::ProductId;
use duka_commerce::repository::WishlistRepository;
use duka_commerce::wishlist::WishlistEntry;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct WishlistRow {
    product_id: Uuid,
    added_at: DateTime<Utc>,
}

/// Wishlist repository on Postgres.
#[derive(Debug, Clone)]
pub struct PgWishlists {
    pool: PgPool,
}

impl PgWishlists {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WishlistRepository for PgWishlists {
    async fn list(&self, owner: &CartOwner) -> Result<Vec<WishlistEntry>, CommerceError> {
        let rows = sqlx::query_as::<_, WishlistRow>(
            "SELECT product_id, added_at FROM wishlist_items \
             WHERE owner_kind = $1 AND owner_key = $2 \
             ORDER BY added_at DESC",
        )
        .bind(owner.kind())
        .bind(owner.key())
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| WishlistEntry {
                owner: owner.clone(),
                product_id: ProductId::from_uuid(row.product_id),
                added_at: row.added_at,
            })
            .collect())
    }

    async fn add(&self, entry: &WishlistEntry) -> Result<bool, CommerceError> {
        let result = sqlx::query(
            "INSERT INTO wishlist_items (owner_kind, owner_key, product_id, added_at) \
             VALUES ($1, $2, $3, $4) ON CONFLICT DO NOTHING",
        )
        .bind(entry.owner.kind())
        .bind(entry.owner.key())
        .bind(entry.product_id.as_uuid())
        .bind(entry.added_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, owner: &CartOwner, product_id: ProductId) -> Result<bool, CommerceError> {
        let result = sqlx::query(
            "DELETE FROM wishlist_items \
             WHERE owner_kind = $1 AND owner_key = $2 AND product_id = $3",
        )
        .bind(owner.kind())
        .bind(owner.key())
        .bind(product_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(result.rows_affected() > 0)
    }
}
