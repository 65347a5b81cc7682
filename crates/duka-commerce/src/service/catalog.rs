//! Browse and admin catalog operations.

use crate::catalog::{
    summarize, Category, NewReview, Page, Product, ProductDetail, ProductImage, ProductInput,
    ProductPatch, ProductQuery, Review,
};
use crate::clock::Clock;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::repository::CatalogRepository;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn CatalogRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { catalog, clock }
    }

    /// Public listing: active products only.
    pub async fn list(&self, mut query: ProductQuery) -> Result<Page<Product>, CommerceError> {
        query.include_hidden = false;
        self.catalog.list_products(&query.normalized()).await
    }

    /// Admin listing: drafts and archived products included.
    pub async fn list_all(&self, mut query: ProductQuery) -> Result<Page<Product>, CommerceError> {
        query.include_hidden = true;
        self.catalog.list_products(&query.normalized()).await
    }

    /// Product page data for an active product.
    pub async fn detail(&self, slug: &str) -> Result<ProductDetail, CommerceError> {
        let product = self.visible_by_slug(slug).await?;
        let category = match product.category_id {
            Some(id) => self.catalog.get_category(id).await?,
            None => None,
        };
        let reviews = self.catalog.list_reviews(product.id).await?;
        Ok(ProductDetail {
            product,
            category,
            reviews,
        })
    }

    pub async fn categories(&self) -> Result<Vec<Category>, CommerceError> {
        self.catalog.list_categories().await
    }

    pub async fn create_category(&self, category: Category) -> Result<Category, CommerceError> {
        category.validate()?;
        self.catalog.create_category(&category).await?;
        Ok(category)
    }

    /// Attach a review to an active product.
    #[instrument(skip_all, fields(slug = %slug, rating = review.rating))]
    pub async fn add_review(&self, slug: &str, review: NewReview) -> Result<Review, CommerceError> {
        review.validate()?;
        let product = self.visible_by_slug(slug).await?;
        let review = review.into_review(product.id, self.clock.now());
        self.catalog.add_review(&review).await?;
        let all = self.catalog.list_reviews(product.id).await?;
        let summary = summarize(&all);
        info!(count = summary.count, average = summary.average, "review added");
        Ok(review)
    }

    pub async fn get(&self, id: ProductId) -> Result<Product, CommerceError> {
        self.catalog
            .get_product(id)
            .await?
            .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))
    }

    #[instrument(skip_all, fields(name = %input.name))]
    pub async fn create_product(&self, input: ProductInput) -> Result<Product, CommerceError> {
        input.validate()?;
        let product = input.into_product(self.clock.now());
        self.ensure_slug_free(&product.slug, None).await?;
        self.catalog.create_product(&product).await?;
        info!(product_id = %product.id, slug = %product.slug, "product created");
        Ok(product)
    }

    #[instrument(skip_all, fields(product_id = %id))]
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Product, CommerceError> {
        let mut product = self.get(id).await?;
        let input = patch.merge_into(&product);
        input.validate()?;
        product.apply(input, self.clock.now());
        self.ensure_slug_free(&product.slug, Some(id)).await?;
        self.catalog.update_product(&product).await?;
        Ok(product)
    }

    #[instrument(skip_all, fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), CommerceError> {
        if !self.catalog.delete_product(id).await? {
            return Err(CommerceError::ProductNotFound(id.to_string()));
        }
        info!("product deleted");
        Ok(())
    }

    /// Replace a product's images. The first image becomes primary unless one
    /// is flagged; positions follow list order.
    pub async fn set_images(
        &self,
        id: ProductId,
        mut images: Vec<ProductImage>,
    ) -> Result<Product, CommerceError> {
        let mut product = self.get(id).await?;
        for (position, image) in images.iter_mut().enumerate() {
            if image.url.trim().is_empty() {
                return Err(CommerceError::invalid(
                    &format!("images.{position}.url"),
                    "Image URL is required",
                ));
            }
            image.position = position as i32;
        }
        let primary = images.iter().position(|i| i.is_primary).unwrap_or(0);
        for (idx, image) in images.iter_mut().enumerate() {
            image.is_primary = idx == primary;
        }
        self.catalog.set_images(id, &images).await?;
        product.images = images;
        Ok(product)
    }

    async fn visible_by_slug(&self, slug: &str) -> Result<Product, CommerceError> {
        self.catalog
            .get_product_by_slug(slug)
            .await?
            .filter(Product::is_available)
            .ok_or_else(|| CommerceError::ProductNotFound(slug.to_string()))
    }

    async fn ensure_slug_free(&self, slug: &str, owner: Option<ProductId>) -> Result<(), CommerceError> {
        match self.catalog.get_product_by_slug(slug).await? {
            Some(existing) if Some(existing.id) != owner => Err(CommerceError::Conflict(format!(
                "slug '{slug}' is already in use"
            ))),
            _ => Ok(()),
        }
    }
}
