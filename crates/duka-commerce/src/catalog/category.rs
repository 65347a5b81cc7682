//! Category types for product organization.

use crate::ids::CategoryId;
use crate::validation::{slugify, FieldErrors};
use serde::{Deserialize, Serialize};

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Category name.
    pub name: String,
    /// URL-friendly slug.
    pub slug: String,
    /// Category description.
    pub description: Option<String>,
}

impl Category {
    /// Create a category, deriving the slug from the name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: CategoryId::generate(),
            slug: slugify(&name),
            name,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(self.name.trim().is_empty(), "name", "Name is required");
        errors.check(self.slug.is_empty(), "slug", "Slug is required");
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_slug() {
        let cat = Category::new("Home & Kitchen");
        assert_eq!(cat.slug, "home-kitchen");
        assert!(cat.validate().is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        let cat = Category::new("  ");
        let errors = cat.validate().unwrap_err();
        assert!(errors.contains("name"));
        assert!(errors.contains("slug"));
    }
}
