//! Product reviews.

use crate::catalog::RatingSummary;
use crate::ids::{ProductId, ReviewId};
use crate::validation::FieldErrors;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// A customer review of a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub author_name: String,
    /// 1 to 5 stars.
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Review submission body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewReview {
    /// Falls back to the signed-in user's name when omitted.
    #[serde(default)]
    pub author_name: Option<String>,
    pub rating: i16,
    #[serde(default)]
    pub comment: Option<String>,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(
            !(MIN_RATING..=MAX_RATING).contains(&self.rating),
            "rating",
            "Rating must be between 1 and 5",
        );
        errors.check(
            self.author_name.as_deref().map_or(true, |n| n.trim().is_empty()),
            "author_name",
            "Name is required",
        );
        if let Some(comment) = &self.comment {
            errors.check(comment.chars().count() > 2000, "comment", "Comment is too long");
        }
        errors.into_result()
    }

    pub fn into_review(self, product_id: ProductId, now: DateTime<Utc>) -> Review {
        Review {
            id: ReviewId::generate(),
            product_id,
            author_name: self.author_name.unwrap_or_default().trim().to_string(),
            rating: self.rating,
            comment: self.comment.filter(|c| !c.trim().is_empty()),
            created_at: now,
        }
    }
}

/// Average and count over a set of reviews.
pub fn summarize(reviews: &[Review]) -> RatingSummary {
    if reviews.is_empty() {
        return RatingSummary::default();
    }
    let total: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    let count = reviews.len() as i64;
    RatingSummary {
        average: total as f64 / count as f64,
        count,
    }
}
