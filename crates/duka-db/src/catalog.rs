//! Products, images, categories and reviews.

use crate::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duka_commerce::catalog::{
    Category, Page, Product, ProductImage, ProductQuery, ProductStatus, RatingSummary, Review,
};
use duka_commerce::error::CommerceError;
use duka_commerce::ids::{CategoryId, ImageId, ProductId, ReviewId};
use duka_commerce::money::{Currency, Money};
use duka_commerce::repository::CatalogRepository;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Product columns plus the review aggregate.
const PRODUCT_SELECT: &str = "SELECT p.id, p.category_id, p.name, p.slug, p.description, \
     p.currency, p.price, p.sale_price, p.stock, p.status, p.featured, p.attributes, \
     p.created_at, p.updated_at, \
     COALESCE(r.average, 0)::float8 AS rating_average, \
     COALESCE(r.count, 0)::int8 AS rating_count \
     FROM products p \
     LEFT JOIN categories c ON c.id = p.category_id \
     LEFT JOIN (SELECT product_id, AVG(rating)::float8 AS average, COUNT(*) AS count \
                FROM reviews GROUP BY product_id) r ON r.product_id = p.id";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    category_id: Option<Uuid>,
    name: String,
    slug: String,
    description: Option<String>,
    currency: String,
    price: i64,
    sale_price: Option<i64>,
    stock: i64,
    status: String,
    featured: bool,
    attributes: Json<BTreeMap<String, Vec<String>>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    rating_average: f64,
    rating_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    id: Uuid,
    product_id: Uuid,
    url: String,
    alt: Option<String>,
    position: i32,
    is_primary: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    slug: String,
    description: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    product_id: Uuid,
    author_name: String,
    rating: i16,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

pub(crate) fn parse_currency(code: &str) -> Result<Currency, DbError> {
    Currency::from_code(code).ok_or_else(|| DbError::Decode(format!("unknown currency {code}")))
}

impl ProductRow {
    fn into_product(self, images: Vec<ProductImage>) -> Result<Product, DbError> {
        let currency = parse_currency(&self.currency)?;
        let status = ProductStatus::parse(&self.status)
            .ok_or_else(|| DbError::Decode(format!("unknown product status {}", self.status)))?;
        Ok(Product {
            id: ProductId::from_uuid(self.id),
            category_id: self.category_id.map(CategoryId::from_uuid),
            name: self.name,
            slug: self.slug,
            description: self.description,
            price: Money::new(self.price, currency),
            sale_price: self.sale_price.map(|amount| Money::new(amount, currency)),
            stock: self.stock,
            status,
            featured: self.featured,
            attributes: self.attributes.0,
            images,
            rating: RatingSummary {
                average: self.rating_average,
                count: self.rating_count,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl From<ImageRow> for ProductImage {
    fn from(row: ImageRow) -> Self {
        ProductImage {
            id: ImageId::from_uuid(row.id),
            url: row.url,
            alt: row.alt,
            position: row.position,
            is_primary: row.is_primary,
        }
    }
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: CategoryId::from_uuid(row.id),
            name: row.name,
            slug: row.slug,
            description: row.description,
        }
    }
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: ReviewId::from_uuid(row.id),
            product_id: ProductId::from_uuid(row.product_id),
            author_name: row.author_name,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

/// Append the WHERE clause for a listing query.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ProductQuery) {
    qb.push(" WHERE TRUE");
    if !query.include_hidden {
        qb.push(" AND p.status = 'active'");
    }
    if let Some(category) = &query.category {
        qb.push(" AND c.slug = ").push_bind(category.clone());
    }
    if let Some(q) = &query.q {
        let pattern = format!("%{}%", escape_like(q));
        qb.push(" AND (p.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(min) = query.min_price {
        qb.push(" AND COALESCE(p.sale_price, p.price) >= ").push_bind(min);
    }
    if let Some(max) = query.max_price {
        qb.push(" AND COALESCE(p.sale_price, p.price) <= ").push_bind(max);
    }
    if query.in_stock == Some(true) {
        qb.push(" AND p.stock > 0");
    }
    if let Some(featured) = query.featured {
        qb.push(" AND p.featured = ").push_bind(featured);
    }
}

/// Escape `%`, `_` and `\` so user text matches literally inside ILIKE.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Catalog repository on Postgres.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn images_for(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<ProductImage>>, DbError> {
        let rows = sqlx::query_as::<_, ImageRow>(
            "SELECT id, product_id, url, alt, position, is_primary \
             FROM product_images WHERE product_id = ANY($1) \
             ORDER BY product_id, position",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        let mut by_product: HashMap<Uuid, Vec<ProductImage>> = HashMap::new();
        for row in rows {
            by_product.entry(row.product_id).or_default().push(row.into());
        }
        Ok(by_product)
    }

    async fn hydrate(&self, rows: Vec<ProductRow>) -> Result<Vec<Product>, DbError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut images = self.images_for(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let own = images.remove(&row.id).unwrap_or_default();
                row.into_product(own)
            })
            .collect()
    }

    async fn fetch_one_where(&self, column: &str, value: ProductKey<'_>) -> Result<Option<Product>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        qb.push(" WHERE p.").push(column).push(" = ");
        match value {
            ProductKey::Id(id) => qb.push_bind(id),
            ProductKey::Slug(slug) => qb.push_bind(slug.to_string()),
        };
        let row = qb
            .build_query_as::<ProductRow>()
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

enum ProductKey<'a> {
    Id(Uuid),
    Slug(&'a str),
}

#[async_trait]
impl CatalogRepository for PgCatalog {
    async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>, CommerceError> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM products p LEFT JOIN categories c ON c.id = p.category_id",
        );
        push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;

        let mut select = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        push_filters(&mut select, query);
        select
            .push(" ORDER BY ")
            .push(query.sort.to_sql())
            .push(" LIMIT ")
            .push_bind(query.per_page)
            .push(" OFFSET ")
            .push_bind(query.offset());
        let rows = select
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        let items = self.hydrate(rows).await?;
        Ok(Page::new(items, total, query.page, query.per_page))
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, CommerceError> {
        Ok(self.fetch_one_where("id", ProductKey::Id(id.as_uuid())).await?)
    }

    async fn get_product_by_slug(&self, slug: &str) -> Result<Option<Product>, CommerceError> {
        Ok(self.fetch_one_where("slug", ProductKey::Slug(slug)).await?)
    }

    async fn create_product(&self, product: &Product) -> Result<(), CommerceError> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        sqlx::query(
            "INSERT INTO products \
                 (id, category_id, name, slug, description, currency, price, sale_price, \
                  stock, status, featured, attributes, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(product.id.as_uuid())
        .bind(product.category_id.map(|c| c.as_uuid()))
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(product.price.currency.code())
        .bind(product.price.amount)
        .bind(product.sale_price.map(|m| m.amount))
        .bind(product.stock)
        .bind(product.status.as_str())
        .bind(product.featured)
        .bind(Json(&product.attributes))
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;
        insert_images(&mut tx, product.id, &product.images).await?;
        tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<(), CommerceError> {
        let result = sqlx::query(
            "UPDATE products SET \
                 category_id = $2, name = $3, slug = $4, description = $5, currency = $6, \
                 price = $7, sale_price = $8, stock = $9, status = $10, featured = $11, \
                 attributes = $12, updated_at = $13 \
             WHERE id = $1",
        )
        .bind(product.id.as_uuid())
        .bind(product.category_id.map(|c| c.as_uuid()))
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(product.price.currency.code())
        .bind(product.price.amount)
        .bind(product.sale_price.map(|m| m.amount))
        .bind(product.stock)
        .bind(product.status.as_str())
        .bind(product.featured)
        .bind(Json(&product.attributes))
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;
        if result.rows_affected() == 0 {
            return Err(CommerceError::ProductNotFound(product.id.to_string()));
        }
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, CommerceError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_images(&self, id: ProductId, images: &[ProductImage]) -> Result<(), CommerceError> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        sqlx::query("DELETE FROM product_images WHERE product_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;
        insert_images(&mut tx, id, images).await?;
        tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CommerceError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug, description FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, CommerceError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug, description FROM categories WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(row.map(Category::from))
    }

    async fn create_category(&self, category: &Category) -> Result<(), CommerceError> {
        sqlx::query("INSERT INTO categories (id, name, slug, description) VALUES ($1, $2, $3, $4)")
            .bind(category.id.as_uuid())
            .bind(&category.name)
            .bind(&category.slug)
            .bind(&category.description)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn list_reviews(&self, product_id: ProductId) -> Result<Vec<Review>, CommerceError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT id, product_id, author_name, rating, comment, created_at \
             FROM reviews WHERE product_id = $1 ORDER BY created_at DESC",
        )
        .bind(product_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn add_review(&self, review: &Review) -> Result<(), CommerceError> {
        sqlx::query(
            "INSERT INTO reviews (id, product_id, author_name, rating, comment, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(review.id.as_uuid())
        .bind(review.product_id.as_uuid())
        .bind(&review.author_name)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(())
    }
}

async fn insert_images(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    product_id: ProductId,
    images: &[ProductImage],
) -> Result<(), DbError> {
    for image in images {
        sqlx::query(
            "INSERT INTO product_images (id, product_id, url, alt, position, is_primary) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(image.id.as_uuid())
        .bind(product_id.as_uuid())
        .bind(&image.url)
        .bind(&image.alt)
        .bind(image.position)
        .bind(image.is_primary)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("kitenge"), "kitenge");
    }

    #[test]
    fn test_filters_bind_user_text() {
        let query = ProductQuery::default()
            .with_text("kanga")
            .with_category("fabrics")
            .with_price_range(Some(1_000), Some(50_000));
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM products p");
        push_filters(&mut qb, &query);
        let sql = qb.sql();
        assert!(sql.contains("p.status = 'active'"));
        assert!(sql.contains("c.slug = $1"));
        assert!(sql.contains("p.name ILIKE $2 OR p.description ILIKE $3"));
        assert!(sql.contains("COALESCE(p.sale_price, p.price) >= $4"));
        assert!(sql.contains("COALESCE(p.sale_price, p.price) <= $5"));
        assert!(!sql.contains("kanga"));
    }

    #[test]
    fn test_admin_filters_include_hidden() {
        let query = ProductQuery {
            include_hidden: true,
            ..ProductQuery::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM products p");
        push_filters(&mut qb, &query);
        assert!(!qb.sql().contains("status"));
    }

    #[test]
    fn test_row_into_product() {
        let row = ProductRow {
            id: Uuid::new_v4(),
            category_id: None,
            name: "Kikoi".to_string(),
            slug: "kikoi".to_string(),
            description: None,
            currency: "TZS".to_string(),
            price: 30_000,
            sale_price: Some(25_000),
            stock: 4,
            status: "active".to_string(),
            featured: true,
            attributes: Json(BTreeMap::new()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            rating_average: 4.5,
            rating_count: 2,
        };
        let product = row.into_product(Vec::new()).unwrap();
        assert_eq!(product.effective_price(), Money::tzs(25_000));
        assert_eq!(product.rating.count, 2);
    }

    #[test]
    fn test_row_with_bad_status_is_decode_error() {
        let row = ProductRow {
            id: Uuid::new_v4(),
            category_id: None,
            name: "Kikoi".to_string(),
            slug: "kikoi".to_string(),
            description: None,
            currency: "TZS".to_string(),
            price: 30_000,
            sale_price: None,
            stock: 4,
            status: "deleted".to_string(),
            featured: false,
            attributes: Json(BTreeMap::new()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            rating_average: 0.0,
            rating_count: 0,
        };
        assert!(matches!(row.into_product(Vec::new()), Err(DbError::Decode(_))));
    }
}
