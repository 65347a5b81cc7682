//! Placed orders and their lines.

use crate::catalog::parse_currency;
use crate::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duka_commerce::cart::{AttributeSelection, CartOwner};
use duka_commerce::catalog::Page;
use duka_commerce::checkout::{
    ContactDetails, DeliveryAddress, DeliveryMethod, Order, OrderItem, OrderStatus,
    PaymentSelection, PaymentStatus, PriceBreakdown,
};
use duka_commerce::error::CommerceError;
use duka_commerce::ids::{OrderId, OrderItemId, ProductId};
use duka_commerce::money::Money;
use duka_commerce::repository::OrderRepository;
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

const ORDER_COLUMNS: &str = "id, order_number, owner_kind, owner_key, contact, delivery_method, \
     address, payment, pricing, status, payment_status, invoice_url, verification_code, \
     created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    owner_kind: String,
    owner_key: String,
    contact: Json<ContactDetails>,
    delivery_method: String,
    address: Option<Json<DeliveryAddress>>,
    payment: Json<PaymentSelection>,
    pricing: Json<PriceBreakdown>,
    status: String,
    payment_status: String,
    invoice_url: Option<String>,
    verification_code: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    product_name: String,
    attributes: Json<AttributeSelection>,
    quantity: i64,
    currency: String,
    unit_price: i64,
    line_total: i64,
}

impl OrderItemRow {
    fn into_item(self) -> Result<OrderItem, DbError> {
        let currency = parse_currency(&self.currency)?;
        Ok(OrderItem {
            id: OrderItemId::from_uuid(self.id),
            product_id: ProductId::from_uuid(self.product_id),
            product_name: self.product_name,
            attributes: self.attributes.0,
            quantity: self.quantity,
            unit_price: Money::new(self.unit_price, currency),
            line_total: Money::new(self.line_total, currency),
        })
    }
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, DbError> {
        let owner = CartOwner::from_parts(&self.owner_kind, &self.owner_key).ok_or_else(|| {
            DbError::Decode(format!("bad order owner {}:{}", self.owner_kind, self.owner_key))
        })?;
        let delivery_method = DeliveryMethod::parse(&self.delivery_method).ok_or_else(|| {
            DbError::Decode(format!("unknown delivery method {}", self.delivery_method))
        })?;
        let status = OrderStatus::parse(&self.status)
            .ok_or_else(|| DbError::Decode(format!("unknown order status {}", self.status)))?;
        let payment_status = PaymentStatus::parse(&self.payment_status).ok_or_else(|| {
            DbError::Decode(format!("unknown payment status {}", self.payment_status))
        })?;
        Ok(Order {
            id: OrderId::from_uuid(self.id),
            order_number: self.order_number,
            owner,
            contact: self.contact.0,
            delivery_method,
            address: self.address.map(|a| a.0),
            payment: self.payment.0,
            pricing: self.pricing.0,
            items,
            status,
            payment_status,
            invoice_url: self.invoice_url,
            verification_code: self.verification_code,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Order repository on Postgres.
#[derive(Debug, Clone)]
pub struct PgOrders {
    pool: PgPool,
}

impl PgOrders {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach lines to already fetched order rows, preserving row order.
    async fn assemble(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, DbError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, product_id, product_name, attributes, quantity, currency, \
                    unit_price, line_total \
             FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, position",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in item_rows {
            let order_id = row.order_id;
            by_order.entry(order_id).or_default().push(row.into_item()?);
        }
        rows.into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect()
    }

    async fn fetch_one(&self, sql: &str, key: OrderKey<'_>) -> Result<Option<Order>, DbError> {
        let query = sqlx::query_as::<_, OrderRow>(sql);
        let query = match key {
            OrderKey::Id(id) => query.bind(id),
            OrderKey::Number(number) => query.bind(number.to_string()),
        };
        match query.fetch_optional(&self.pool).await? {
            Some(row) => Ok(self.assemble(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

enum OrderKey<'a> {
    Id(Uuid),
    Number(&'a str),
}

#[async_trait]
impl OrderRepository for PgOrders {
    async fn create(&self, order: &Order) -> Result<(), CommerceError> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        sqlx::query(
            "INSERT INTO orders \
                 (id, order_number, owner_kind, owner_key, contact, delivery_method, address, \
                  payment, pricing, status, payment_status, invoice_url, verification_code, \
                  created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(order.id.as_uuid())
        .bind(&order.order_number)
        .bind(order.owner.kind())
        .bind(order.owner.key())
        .bind(Json(&order.contact))
        .bind(order.delivery_method.as_str())
        .bind(order.address.as_ref().map(Json))
        .bind(Json(&order.payment))
        .bind(Json(&order.pricing))
        .bind(order.status.as_str())
        .bind(order.payment_status.as_str())
        .bind(&order.invoice_url)
        .bind(&order.verification_code)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_items \
                     (id, order_id, position, product_id, product_name, attributes, quantity, \
                      currency, unit_price, line_total) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            )
            .bind(item.id.as_uuid())
            .bind(order.id.as_uuid())
            .bind(position as i32)
            .bind(item.product_id.as_uuid())
            .bind(&item.product_name)
            .bind(Json(&item.attributes))
            .bind(item.quantity)
            .bind(item.unit_price.currency.code())
            .bind(item.unit_price.amount)
            .bind(item.line_total.amount)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;
        }

        tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, CommerceError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        Ok(self.fetch_one(&sql, OrderKey::Id(id.as_uuid())).await?)
    }

    async fn get_by_number(&self, order_number: &str) -> Result<Option<Order>, CommerceError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1");
        Ok(self.fetch_one(&sql, OrderKey::Number(order_number)).await?)
    }

    async fn list(&self, page: i64, per_page: i64) -> Result<Page<Order>, CommerceError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;
        let orders = self.assemble(rows).await?;
        Ok(Page::new(orders, total, page, per_page))
    }

    async fn update(&self, order: &Order) -> Result<(), CommerceError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $2, payment_status = $3, invoice_url = $4, \
                 verification_code = $5, updated_at = $6 \
             WHERE id = $1",
        )
        .bind(order.id.as_uuid())
        .bind(order.status.as_str())
        .bind(order.payment_status.as_str())
        .bind(&order.invoice_url)
        .bind(&order.verification_code)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;
        if result.rows_affected() == 0 {
            return Err(CommerceError::OrderNotFound(order.id.to_string()));
        }
        Ok(())
    }
}
