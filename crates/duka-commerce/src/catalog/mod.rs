//! Product catalog module.
//!
//! Contains types for products, categories, reviews, and listing queries.

mod category;
mod product;
mod query;
mod review;

pub use category::Category;
pub use product::{
    Product, ProductImage, ProductInput, ProductPatch, ProductStatus, RatingSummary,
};
pub use query::{Page, ProductQuery, SortOption, DEFAULT_PER_PAGE, MAX_PER_PAGE};
pub use review::{summarize, NewReview, Review, MAX_RATING, MIN_RATING};

use serde::{Deserialize, Serialize};

/// Everything the product page shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDetail {
    pub product: Product,
    pub category: Option<Category>,
    pub reviews: Vec<Review>,
}
