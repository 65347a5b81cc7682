//! Server-side carts and their lines.

use crate::catalog::parse_currency;
use crate::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duka_commerce::cart::{AttributeSelection, Cart, CartItem, CartOwner, ProductSnapshot};
use duka_commerce::error::CommerceError;
use duka_commerce::ids::{CartId, CartItemId, ProductId};
use duka_commerce::money::Money;
use duka_commerce::repository::CartRepository;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    owner_kind: String,
    owner_key: String,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: Uuid,
    cart_id: Uuid,
    product_id: Uuid,
    quantity: i64,
    unit_price: i64,
    attributes: Json<AttributeSelection>,
    product: Json<ProductSnapshot>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CartRow {
    fn into_cart(self, items: Vec<CartItemRow>) -> Result<Cart, DbError> {
        let owner = CartOwner::from_parts(&self.owner_kind, &self.owner_key).ok_or_else(|| {
            DbError::Decode(format!("bad cart owner {}:{}", self.owner_kind, self.owner_key))
        })?;
        let currency = parse_currency(&self.currency)?;
        let items = items
            .into_iter()
            .map(|row| CartItem {
                id: CartItemId::from_uuid(row.id),
                cart_id: CartId::from_uuid(row.cart_id),
                product_id: ProductId::from_uuid(row.product_id),
                quantity: row.quantity,
                unit_price: Money::new(row.unit_price, currency),
                attributes: row.attributes.0,
                product: row.product.0,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect();
        Ok(Cart {
            id: CartId::from_uuid(self.id),
            owner,
            items,
            currency,
            created_at: self.created_at,
            updated_at: self.updated_at,
            expires_at: self.expires_at,
        })
    }
}

/// Cart repository on Postgres.
#[derive(Debug, Clone)]
pub struct PgCarts {
    pool: PgPool,
}

impl PgCarts {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartRepository for PgCarts {
    async fn find_by_owner(&self, owner: &CartOwner) -> Result<Option<Cart>, CommerceError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, owner_kind, owner_key, currency, created_at, updated_at, expires_at \
             FROM carts WHERE owner_kind = $1 AND owner_key = $2",
        )
        .bind(owner.kind())
        .bind(owner.key())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let items = sqlx::query_as::<_, CartItemRow>(
            "SELECT id, cart_id, product_id, quantity, unit_price, attributes, product, \
                    created_at, updated_at \
             FROM cart_items WHERE cart_id = $1 ORDER BY created_at, id",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(Some(row.into_cart(items)?))
    }

    async fn save(&self, cart: &Cart) -> Result<(), CommerceError> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        sqlx::query(
            "INSERT INTO carts (id, owner_kind, owner_key, currency, created_at, updated_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET \
                 currency = EXCLUDED.currency, \
                 updated_at = EXCLUDED.updated_at, \
                 expires_at = EXCLUDED.expires_at",
        )
        .bind(cart.id.as_uuid())
        .bind(cart.owner.kind())
        .bind(cart.owner.key())
        .bind(cart.currency.code())
        .bind(cart.created_at)
        .bind(cart.updated_at)
        .bind(cart.expires_at)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        let keep: Vec<Uuid> = cart.items.iter().map(|i| i.id.as_uuid()).collect();
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND NOT (id = ANY($2))")
            .bind(cart.id.as_uuid())
            .bind(&keep)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

        // Lines merged in from a guest cart keep their ids, so an upsert
        // moves them over instead of colliding.
        for item in &cart.items {
            sqlx::query(
                "INSERT INTO cart_items \
                     (id, cart_id, product_id, quantity, unit_price, attributes, product, \
                      created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
                 ON CONFLICT (id) DO UPDATE SET \
                     cart_id = EXCLUDED.cart_id, \
                     quantity = EXCLUDED.quantity, \
                     unit_price = EXCLUDED.unit_price, \
                     attributes = EXCLUDED.attributes, \
                     product = EXCLUDED.product, \
                     updated_at = EXCLUDED.updated_at",
            )
            .bind(item.id.as_uuid())
            .bind(cart.id.as_uuid())
            .bind(item.product_id.as_uuid())
            .bind(item.quantity)
            .bind(item.unit_price.amount)
            .bind(Json(&item.attributes))
            .bind(Json(&item.product))
            .bind(item.created_at)
            .bind(item.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;
        }

        tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }

    async fn delete(&self, id: CartId) -> Result<(), CommerceError> {
        sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(())
    }
}
