//! Storage abstractions.
//!
//! The server wires Postgres implementations; tests use in-memory ones.
//! Every method maps backend failures to [`CommerceError::Storage`] and
//! unique-key violations to [`CommerceError::Conflict`].

use crate::cart::{Cart, CartOwner};
use crate::catalog::{Category, Page, Product, ProductImage, ProductQuery, Review};
use crate::checkout::Order;
use crate::content::{ContactInfo, FaqEntry, SiteSettings};
use crate::error::CommerceError;
use crate::ids::{CartId, CategoryId, FaqId, OrderId, ProductId};
use crate::wishlist::WishlistEntry;
use async_trait::async_trait;

/// Products, categories, and reviews.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Filtered, sorted, paginated listing. Expects a normalized query.
    async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>, CommerceError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, CommerceError>;

    async fn get_product_by_slug(&self, slug: &str) -> Result<Option<Product>, CommerceError>;

    /// Insert a product. A taken slug is a conflict.
    async fn create_product(&self, product: &Product) -> Result<(), CommerceError>;

    /// Overwrite a product's fields (images excluded).
    async fn update_product(&self, product: &Product) -> Result<(), CommerceError>;

    /// Hard delete. Returns whether a row was removed.
    async fn delete_product(&self, id: ProductId) -> Result<bool, CommerceError>;

    /// Replace the ordered image list.
    async fn set_images(&self, id: ProductId, images: &[ProductImage]) -> Result<(), CommerceError>;

    async fn list_categories(&self) -> Result<Vec<Category>, CommerceError>;

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, CommerceError>;

    /// Insert a category. A taken slug is a conflict.
    async fn create_category(&self, category: &Category) -> Result<(), CommerceError>;

    /// Reviews for a product, newest first.
    async fn list_reviews(&self, product_id: ProductId) -> Result<Vec<Review>, CommerceError>;

    async fn add_review(&self, review: &Review) -> Result<(), CommerceError>;
}

/// Server-side carts, one per owner.
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn find_by_owner(&self, owner: &CartOwner) -> Result<Option<Cart>, CommerceError>;

    /// Insert or replace the cart and all of its lines.
    async fn save(&self, cart: &Cart) -> Result<(), CommerceError>;

    async fn delete(&self, id: CartId) -> Result<(), CommerceError>;
}

/// Placed orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: &Order) -> Result<(), CommerceError>;

    async fn get(&self, id: OrderId) -> Result<Option<Order>, CommerceError>;

    async fn get_by_number(&self, order_number: &str) -> Result<Option<Order>, CommerceError>;

    /// Newest first.
    async fn list(&self, page: i64, per_page: i64) -> Result<Page<Order>, CommerceError>;

    /// Persist status, payment status and invoice fields.
    async fn update(&self, order: &Order) -> Result<(), CommerceError>;
}

/// Saved products per owner.
#[async_trait]
pub trait WishlistRepository: Send + Sync {
    /// Newest first.
    async fn list(&self, owner: &CartOwner) -> Result<Vec<WishlistEntry>, CommerceError>;

    /// Returns false when the product was already saved.
    async fn add(&self, entry: &WishlistEntry) -> Result<bool, CommerceError>;

    /// Returns whether an entry was removed.
    async fn remove(&self, owner: &CartOwner, product_id: ProductId) -> Result<bool, CommerceError>;
}

/// Admin-edited business content.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn contact_info(&self) -> Result<Option<ContactInfo>, CommerceError>;

    async fn put_contact_info(&self, info: &ContactInfo) -> Result<(), CommerceError>;

    /// Ordered by position. Unpublished entries only when asked for.
    async fn list_faqs(&self, include_unpublished: bool) -> Result<Vec<FaqEntry>, CommerceError>;

    async fn get_faq(&self, id: FaqId) -> Result<Option<FaqEntry>, CommerceError>;

    async fn upsert_faq(&self, entry: &FaqEntry) -> Result<(), CommerceError>;

    async fn delete_faq(&self, id: FaqId) -> Result<bool, CommerceError>;

    async fn settings(&self) -> Result<Option<SiteSettings>, CommerceError>;

    async fn put_settings(&self, settings: &SiteSettings) -> Result<(), CommerceError>;
}
