//! In-memory repositories.
//!
//! Each one keeps its rows behind a `Mutex` and mirrors the ordering and
//! conflict rules of the Postgres implementations closely enough for handler
//! and service tests.

use async_trait::async_trait;
use duka_commerce::cart::{Cart, CartOwner};
use duka_commerce::catalog::{summarize, Category, Page, Product, ProductImage, ProductQuery, Review};
use duka_commerce::checkout::Order;
use duka_commerce::content::{ContactInfo, FaqEntry, SiteSettings};
use duka_commerce::error::CommerceError;
use duka_commerce::ids::{CartId, CategoryId, FaqId, OrderId, ProductId};
use duka_commerce::repository::{
    CartRepository, CatalogRepository, ContentRepository, OrderRepository, WishlistRepository,
};
use duka_commerce::wishlist::WishlistEntry;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct CatalogRows {
    products: Vec<Product>,
    categories: Vec<Category>,
    reviews: Vec<Review>,
}

/// Products, categories and reviews in memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    rows: Mutex<CatalogRows>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a product directly, bypassing slug checks.
    pub fn insert_product(&self, product: Product) {
        lock(&self.rows).products.push(product);
    }

    pub fn insert_category(&self, category: Category) {
        lock(&self.rows).categories.push(category);
    }

    pub fn product_count(&self) -> usize {
        lock(&self.rows).products.len()
    }

    fn with_rating(rows: &CatalogRows, product: &Product) -> Product {
        let reviews: Vec<Review> = rows
            .reviews
            .iter()
            .filter(|r| r.product_id == product.id)
            .cloned()
            .collect();
        let mut product = product.clone();
        product.rating = summarize(&reviews);
        product
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>, CommerceError> {
        let rows = lock(&self.rows);
        let slugs: HashMap<CategoryId, &str> = rows
            .categories
            .iter()
            .map(|c| (c.id, c.slug.as_str()))
            .collect();
        let mut matching: Vec<Product> = rows
            .products
            .iter()
            .map(|p| Self::with_rating(&rows, p))
            .filter(|p| {
                let slug = p.category_id.and_then(|id| slugs.get(&id).copied());
                query.matches(p, slug)
            })
            .collect();
        query.sort.sort(&mut matching);
        Ok(Page::from_slice(matching, query))
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, CommerceError> {
        let rows = lock(&self.rows);
        Ok(rows
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| Self::with_rating(&rows, p)))
    }

    async fn get_product_by_slug(&self, slug: &str) -> Result<Option<Product>, CommerceError> {
        let rows = lock(&self.rows);
        Ok(rows
            .products
            .iter()
            .find(|p| p.slug == slug)
            .map(|p| Self::with_rating(&rows, p)))
    }

    async fn create_product(&self, product: &Product) -> Result<(), CommerceError> {
        let mut rows = lock(&self.rows);
        if rows.products.iter().any(|p| p.slug == product.slug) {
            return Err(CommerceError::Conflict(format!(
                "slug '{}' is already in use",
                product.slug
            )));
        }
        rows.products.push(product.clone());
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<(), CommerceError> {
        let mut rows = lock(&self.rows);
        let existing = rows
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| CommerceError::ProductNotFound(product.id.to_string()))?;
        let images = std::mem::take(&mut existing.images);
        *existing = product.clone();
        existing.images = images;
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, CommerceError> {
        let mut rows = lock(&self.rows);
        let before = rows.products.len();
        rows.products.retain(|p| p.id != id);
        rows.reviews.retain(|r| r.product_id != id);
        Ok(rows.products.len() < before)
    }

    async fn set_images(&self, id: ProductId, images: &[ProductImage]) -> Result<(), CommerceError> {
        let mut rows = lock(&self.rows);
        let product = rows
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))?;
        product.images = images.to_vec();
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CommerceError> {
        let mut categories = lock(&self.rows).categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, CommerceError> {
        Ok(lock(&self.rows).categories.iter().find(|c| c.id == id).cloned())
    }

    async fn create_category(&self, category: &Category) -> Result<(), CommerceError> {
        let mut rows = lock(&self.rows);
        if rows.categories.iter().any(|c| c.slug == category.slug) {
            return Err(CommerceError::Conflict(format!(
                "category slug '{}' is already in use",
                category.slug
            )));
        }
        rows.categories.push(category.clone());
        Ok(())
    }

    async fn list_reviews(&self, product_id: ProductId) -> Result<Vec<Review>, CommerceError> {
        let mut reviews: Vec<Review> = lock(&self.rows)
            .reviews
            .iter()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    async fn add_review(&self, review: &Review) -> Result<(), CommerceError> {
        lock(&self.rows).reviews.push(review.clone());
        Ok(())
    }
}

/// Carts keyed by owner.
#[derive(Debug, Default)]
pub struct InMemoryCarts {
    carts: Mutex<Vec<Cart>>,
}

impl InMemoryCarts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.carts).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CartRepository for InMemoryCarts {
    async fn find_by_owner(&self, owner: &CartOwner) -> Result<Option<Cart>, CommerceError> {
        Ok(lock(&self.carts).iter().find(|c| &c.owner == owner).cloned())
    }

    async fn save(&self, cart: &Cart) -> Result<(), CommerceError> {
        let mut carts = lock(&self.carts);
        carts.retain(|c| c.id != cart.id && c.owner != cart.owner);
        carts.push(cart.clone());
        Ok(())
    }

    async fn delete(&self, id: CartId) -> Result<(), CommerceError> {
        lock(&self.carts).retain(|c| c.id != id);
        Ok(())
    }
}

/// A cart repository whose every call fails, for error-path tests.
#[derive(Debug, Default)]
pub struct FailingCarts;

#[async_trait]
impl CartRepository for FailingCarts {
    async fn find_by_owner(&self, _owner: &CartOwner) -> Result<Option<Cart>, CommerceError> {
        Err(CommerceError::Storage("connection refused".into()))
    }

    async fn save(&self, _cart: &Cart) -> Result<(), CommerceError> {
        Err(CommerceError::Storage("connection refused".into()))
    }

    async fn delete(&self, _id: CartId) -> Result<(), CommerceError> {
        Err(CommerceError::Storage("connection refused".into()))
    }
}

/// Orders in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryOrders {
    orders: Mutex<Vec<Order>>,
}

impl InMemoryOrders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored order.
    pub fn all(&self) -> Vec<Order> {
        lock(&self.orders).clone()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn create(&self, order: &Order) -> Result<(), CommerceError> {
        let mut orders = lock(&self.orders);
        if orders.iter().any(|o| o.order_number == order.order_number) {
            return Err(CommerceError::Conflict(format!(
                "order number {} already exists",
                order.order_number
            )));
        }
        orders.push(order.clone());
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, CommerceError> {
        Ok(lock(&self.orders).iter().find(|o| o.id == id).cloned())
    }

    async fn get_by_number(&self, order_number: &str) -> Result<Option<Order>, CommerceError> {
        Ok(lock(&self.orders)
            .iter()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    async fn list(&self, page: i64, per_page: i64) -> Result<Page<Order>, CommerceError> {
        let mut orders = lock(&self.orders).clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = orders.len() as i64;
        let items = orders
            .into_iter()
            .skip(((page.max(1) - 1) * per_page) as usize)
            .take(per_page as usize)
            .collect();
        Ok(Page::new(items, total, page, per_page))
    }

    async fn update(&self, order: &Order) -> Result<(), CommerceError> {
        let mut orders = lock(&self.orders);
        let existing = orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or_else(|| CommerceError::OrderNotFound(order.id.to_string()))?;
        *existing = order.clone();
        Ok(())
    }
}

/// Wishlist entries.
#[derive(Debug, Default)]
pub struct InMemoryWishlists {
    entries: Mutex<Vec<WishlistEntry>>,
}

impl InMemoryWishlists {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WishlistRepository for InMemoryWishlists {
    async fn list(&self, owner: &CartOwner) -> Result<Vec<WishlistEntry>, CommerceError> {
        let mut entries: Vec<WishlistEntry> = lock(&self.entries)
            .iter()
            .filter(|e| &e.owner == owner)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        Ok(entries)
    }

    async fn add(&self, entry: &WishlistEntry) -> Result<bool, CommerceError> {
        let mut entries = lock(&self.entries);
        if entries
            .iter()
            .any(|e| e.owner == entry.owner && e.product_id == entry.product_id)
        {
            return Ok(false);
        }
        entries.push(entry.clone());
        Ok(true)
    }

    async fn remove(&self, owner: &CartOwner, product_id: ProductId) -> Result<bool, CommerceError> {
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|e| !(&e.owner == owner && e.product_id == product_id));
        Ok(entries.len() < before)
    }
}

#[derive(Debug, Default)]
struct ContentRows {
    contact: Option<ContactInfo>,
    faqs: Vec<FaqEntry>,
    settings: Option<SiteSettings>,
}

/// Business content.
#[derive(Debug, Default)]
pub struct InMemoryContent {
    rows: Mutex<ContentRows>,
}

impl InMemoryContent {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentRepository for InMemoryContent {
    async fn contact_info(&self) -> Result<Option<ContactInfo>, CommerceError> {
        Ok(lock(&self.rows).contact.clone())
    }

    async fn put_contact_info(&self, info: &ContactInfo) -> Result<(), CommerceError> {
        lock(&self.rows).contact = Some(info.clone());
        Ok(())
    }

    async fn list_faqs(&self, include_unpublished: bool) -> Result<Vec<FaqEntry>, CommerceError> {
        let mut faqs: Vec<FaqEntry> = lock(&self.rows)
            .faqs
            .iter()
            .filter(|f| include_unpublished || f.published)
            .cloned()
            .collect();
        faqs.sort_by_key(|f| f.position);
        Ok(faqs)
    }

    async fn get_faq(&self, id: FaqId) -> Result<Option<FaqEntry>, CommerceError> {
        Ok(lock(&self.rows).faqs.iter().find(|f| f.id == id).cloned())
    }

    async fn upsert_faq(&self, entry: &FaqEntry) -> Result<(), CommerceError> {
        let mut rows = lock(&self.rows);
        rows.faqs.retain(|f| f.id != entry.id);
        rows.faqs.push(entry.clone());
        Ok(())
    }

    async fn delete_faq(&self, id: FaqId) -> Result<bool, CommerceError> {
        let mut rows = lock(&self.rows);
        let before = rows.faqs.len();
        rows.faqs.retain(|f| f.id != id);
        Ok(rows.faqs.len() < before)
    }

    async fn settings(&self) -> Result<Option<SiteSettings>, CommerceError> {
        Ok(lock(&self.rows).settings.clone())
    }

    async fn put_settings(&self, settings: &SiteSettings) -> Result<(), CommerceError> {
        lock(&self.rows).settings = Some(settings.clone());
        Ok(())
    }
}
