//! Product types.

use crate::cart::{AttributeSelection, ProductSnapshot};
use crate::error::CommerceError;
use crate::ids::{CategoryId, ImageId, ProductId};
use crate::money::Money;
use crate::validation::{slugify, FieldErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Product status in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Product is in draft mode, not visible to customers.
    Draft,
    /// Product is active and visible.
    #[default]
    Active,
    /// Product is archived, not visible but data preserved.
    Archived,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Active => "active",
            ProductStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(ProductStatus::Draft),
            "active" => Some(ProductStatus::Active),
            "archived" => Some(ProductStatus::Archived),
            _ => None,
        }
    }
}

/// An image attached to a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductImage {
    #[serde(default = "ImageId::generate")]
    pub id: ImageId,
    /// Public URL.
    pub url: String,
    /// Alt text for accessibility.
    #[serde(default)]
    pub alt: Option<String>,
    /// Sort order position.
    #[serde(default)]
    pub position: i32,
    /// Whether this is the listing image.
    #[serde(default)]
    pub is_primary: bool,
}

impl ProductImage {
    pub fn new(url: impl Into<String>, position: i32) -> Self {
        Self {
            id: ImageId::generate(),
            url: url.into(),
            alt: None,
            position,
            is_primary: position == 0,
        }
    }
}

/// Aggregated review score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct RatingSummary {
    /// Mean rating, 0.0 when there are no reviews.
    pub average: f64,
    /// Number of reviews.
    pub count: i64,
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Category this product belongs to.
    pub category_id: Option<CategoryId>,
    /// Product name.
    pub name: String,
    /// URL-friendly slug (unique).
    pub slug: String,
    /// Full description.
    pub description: Option<String>,
    /// Original (list) price.
    pub price: Money,
    /// Sale price, when discounted.
    pub sale_price: Option<Money>,
    /// Units in stock.
    pub stock: i64,
    /// Product visibility status.
    pub status: ProductStatus,
    /// Shown on the home page.
    pub featured: bool,
    /// Selectable attributes, e.g. `color -> [red, blue]`.
    pub attributes: BTreeMap<String, Vec<String>>,
    /// Images ordered by position.
    pub images: Vec<ProductImage>,
    /// Review score.
    pub rating: RatingSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create a new active product.
    pub fn new(name: impl Into<String>, slug: impl Into<String>, price: Money) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::generate(),
            category_id: None,
            name: name.into(),
            slug: slug.into(),
            description: None,
            price,
            sale_price: None,
            stock: 0,
            status: ProductStatus::Active,
            featured: false,
            attributes: BTreeMap::new(),
            images: Vec::new(),
            rating: RatingSummary::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The price a customer pays now: sale price, falling back to the list price.
    pub fn effective_price(&self) -> Money {
        self.sale_price.unwrap_or(self.price)
    }

    /// Check if a sale price below the list price is set.
    pub fn is_discounted(&self) -> bool {
        self.sale_price
            .map(|sale| sale.amount < self.price.amount)
            .unwrap_or(false)
    }

    /// Whole-percent discount, if on sale.
    pub fn discount_percentage(&self) -> Option<i64> {
        if !self.is_discounted() || self.price.amount <= 0 {
            return None;
        }
        let sale = self.effective_price().amount;
        Some(((self.price.amount - sale) * 100) / self.price.amount)
    }

    /// Visible to customers.
    pub fn is_available(&self) -> bool {
        self.status == ProductStatus::Active
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// The listing image: the one flagged primary, else the first.
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images
            .iter()
            .find(|i| i.is_primary)
            .or_else(|| self.images.first())
    }

    /// Check that a selection only names known attributes with allowed values.
    pub fn validate_selection(&self, selection: &AttributeSelection) -> Result<(), CommerceError> {
        let mut errors = FieldErrors::new();
        for (name, value) in selection {
            match self.attributes.get(name) {
                None => errors.add(
                    format!("attributes.{name}"),
                    format!("{} has no option '{name}'", self.name),
                ),
                Some(allowed) if !allowed.iter().any(|a| a == value) => errors.add(
                    format!("attributes.{name}"),
                    format!("'{value}' is not a valid {name}"),
                ),
                Some(_) => {}
            }
        }
        errors.into_result().map_err(CommerceError::Validation)
    }

    /// Denormalized display data carried on cart lines.
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            name: self.name.clone(),
            slug: self.slug.clone(),
            image_url: self.primary_image().map(|i| i.url.clone()),
            stock: self.stock,
            status: self.status,
            original_price: self.price,
            sale_price: self.sale_price,
            is_discounted: self.is_discounted(),
        }
    }

    /// Apply an admin edit.
    pub fn apply(&mut self, input: ProductInput, now: DateTime<Utc>) {
        self.slug = input
            .slug
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| slugify(&input.name));
        self.name = input.name;
        self.category_id = input.category_id;
        self.description = input.description;
        self.price = input.price;
        self.sale_price = input.sale_price;
        self.stock = input.stock;
        self.status = input.status;
        self.featured = input.featured;
        self.attributes = input.attributes;
        self.updated_at = now;
    }
}

/// Admin-supplied product fields for create and update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductInput {
    pub name: String,
    /// Derived from the name when omitted.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub sale_price: Option<Money>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl ProductInput {
    /// Field-level checks.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(self.name.trim().len() < 2, "name", "Name must be at least 2 characters");
        errors.check(self.price.amount <= 0, "price", "Price must be greater than zero");
        errors.check(self.stock < 0, "stock", "Stock cannot be negative");
        if let Some(sale) = self.sale_price {
            errors.check(sale.amount <= 0, "sale_price", "Sale price must be greater than zero");
            errors.check(
                sale.amount >= self.price.amount,
                "sale_price",
                "Sale price must be below the regular price",
            );
            errors.check(
                sale.currency != self.price.currency,
                "sale_price",
                "Sale price must use the same currency",
            );
        }
        if let Some(slug) = &self.slug {
            errors.check(
                !slug.is_empty() && slugify(slug) != *slug,
                "slug",
                "Slug may only contain lowercase letters, digits and dashes",
            );
        }
        for (name, values) in &self.attributes {
            errors.check(
                values.is_empty(),
                &format!("attributes.{name}"),
                "Attribute needs at least one value",
            );
        }
        errors.into_result()
    }

    /// Build a new product from this input.
    pub fn into_product(self, now: DateTime<Utc>) -> Product {
        let mut product = Product::new(String::new(), String::new(), self.price);
        product.created_at = now;
        product.apply(self, now);
        product
    }
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            slug: Some(product.slug.clone()),
            category_id: product.category_id,
            description: product.description.clone(),
            price: product.price,
            sale_price: product.sale_price,
            stock: product.stock,
            status: product.status,
            featured: product.featured,
            attributes: product.attributes.clone(),
        }
    }
}

/// Partial admin edit. Absent fields are left unchanged; `sale_price` and
/// nullable fields use `Some(None)` to clear.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(with = "double_option")]
    pub category_id: Option<Option<CategoryId>>,
    #[serde(with = "double_option")]
    pub description: Option<Option<String>>,
    pub price: Option<Money>,
    #[serde(with = "double_option")]
    pub sale_price: Option<Option<Money>>,
    pub stock: Option<i64>,
    pub status: Option<ProductStatus>,
    pub featured: Option<bool>,
    pub attributes: Option<BTreeMap<String, Vec<String>>>,
}

impl ProductPatch {
    /// Merge onto the current product, yielding the full input to validate.
    pub fn merge_into(self, product: &Product) -> ProductInput {
        let mut input = ProductInput::from(product);
        if let Some(name) = self.name {
            input.name = name;
        }
        if let Some(slug) = self.slug {
            input.slug = Some(slug);
        }
        if let Some(category_id) = self.category_id {
            input.category_id = category_id;
        }
        if let Some(description) = self.description {
            input.description = description;
        }
        if let Some(price) = self.price {
            input.price = price;
        }
        if let Some(sale_price) = self.sale_price {
            input.sale_price = sale_price;
        }
        if let Some(stock) = self.stock {
            input.stock = stock;
        }
        if let Some(status) = self.status {
            input.status = status;
        }
        if let Some(featured) = self.featured {
            input.featured = featured;
        }
        if let Some(attributes) = self.attributes {
            input.attributes = attributes;
        }
        input
    }
}

/// Distinguishes a missing field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T: Serialize, S: Serializer>(
        value: &Option<Option<T>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T: Deserialize<'de>, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<T>>, D::Error> {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
