//! Product listing queries.

use crate::catalog::Product;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: i64 = 24;
pub const MAX_PER_PAGE: i64 = 100;

/// Sort options for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    /// Sort by newest first.
    #[default]
    Newest,
    /// Sort by price, low to high.
    PriceAsc,
    /// Sort by price, high to low.
    PriceDesc,
    /// Sort by name A-Z.
    NameAsc,
    /// Sort by name Z-A.
    NameDesc,
    /// Sort by highest rated.
    Rating,
}

impl SortOption {
    /// SQL ORDER BY clause over the `products` listing view.
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOption::Newest => "p.created_at DESC, p.id",
            SortOption::PriceAsc => "COALESCE(p.sale_price, p.price) ASC, p.id",
            SortOption::PriceDesc => "COALESCE(p.sale_price, p.price) DESC, p.id",
            SortOption::NameAsc => "p.name ASC, p.id",
            SortOption::NameDesc => "p.name DESC, p.id",
            SortOption::Rating => "rating_average DESC, rating_count DESC, p.id",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortOption::Newest => "Newest",
            SortOption::PriceAsc => "Price: Low to High",
            SortOption::PriceDesc => "Price: High to Low",
            SortOption::NameAsc => "Name: A-Z",
            SortOption::NameDesc => "Name: Z-A",
            SortOption::Rating => "Highest Rated",
        }
    }

    /// Sort products in memory with the same ordering as `to_sql`.
    pub fn sort(&self, products: &mut [Product]) {
        match self {
            SortOption::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOption::PriceAsc => {
                products.sort_by_key(|p| p.effective_price().amount);
            }
            SortOption::PriceDesc => {
                products.sort_by(|a, b| b.effective_price().amount.cmp(&a.effective_price().amount));
            }
            SortOption::NameAsc => products.sort_by(|a, b| a.name.cmp(&b.name)),
            SortOption::NameDesc => products.sort_by(|a, b| b.name.cmp(&a.name)),
            SortOption::Rating => products.sort_by(|a, b| {
                b.rating
                    .average
                    .total_cmp(&a.rating.average)
                    .then(b.rating.count.cmp(&a.rating.count))
            }),
        }
    }
}

/// A product listing query, as sent in the query string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProductQuery {
    /// Category slug.
    pub category: Option<String>,
    /// Case-insensitive substring of name or description.
    pub q: Option<String>,
    /// Lower bound on effective price.
    pub min_price: Option<i64>,
    /// Upper bound on effective price.
    pub max_price: Option<i64>,
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
    pub sort: SortOption,
    /// Current page (1-indexed).
    pub page: i64,
    pub per_page: i64,
    /// Include draft and archived products. Only honored for admins.
    #[serde(skip)]
    pub include_hidden: bool,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            category: None,
            q: None,
            min_price: None,
            max_price: None,
            in_stock: None,
            featured: None,
            sort: SortOption::Newest,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            include_hidden: false,
        }
    }
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text query.
    pub fn with_text(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn with_category(mut self, slug: impl Into<String>) -> Self {
        self.category = Some(slug.into());
        self
    }

    pub fn with_price_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Set sort option.
    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }

    /// Set pagination.
    pub fn with_pagination(mut self, page: i64, per_page: i64) -> Self {
        self.page = page;
        self.per_page = per_page;
        self
    }

    /// Clamp paging into range and drop blank text filters.
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.per_page = if self.per_page <= 0 {
            DEFAULT_PER_PAGE
        } else {
            self.per_page.min(MAX_PER_PAGE)
        };
        self.q = self
            .q
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        self.category = self
            .category
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty());
        self
    }

    /// Calculate offset for SQL LIMIT/OFFSET.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.per_page
    }

    /// Whether a product passes every filter. `category_slug` is the slug of
    /// the product's category, if it has one.
    pub fn matches(&self, product: &Product, category_slug: Option<&str>) -> bool {
        if !self.include_hidden && !product.is_available() {
            return false;
        }
        if let Some(wanted) = &self.category {
            if category_slug != Some(wanted.as_str()) {
                return false;
            }
        }
        if let Some(q) = &self.q {
            let needle = q.to_lowercase();
            let in_name = product.name.to_lowercase().contains(&needle);
            let in_description = product
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_name && !in_description {
                return false;
            }
        }
        let price = product.effective_price().amount;
        if self.min_price.is_some_and(|min| price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| price > max) {
            return false;
        }
        if self.in_stock == Some(true) && !product.is_in_stock() {
            return false;
        }
        if let Some(featured) = self.featured {
            if product.featured != featured {
                return false;
            }
        }
        true
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total matching items across all pages.
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };
        Self {
            items,
            total,
            page,
            per_page,
            total_pages,
        }
    }

    /// Slice an already filtered and sorted list into the requested page.
    pub fn from_slice(all: Vec<T>, query: &ProductQuery) -> Self {
        let total = all.len() as i64;
        let items = all
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.per_page as usize)
            .collect();
        Self::new(items, total, query.page, query.per_page)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductStatus;
    use crate::money::Money;
    use chrono::{Duration, Utc};

    fn product(name: &str, price: i64) -> Product {
        let mut p = Product::new(name, name.to_lowercase(), Money::tzs(price));
        p.stock = 5;
        p
    }

    #[test]
    fn test_normalize_clamps_paging() {
        let q = ProductQuery::new().with_pagination(0, 500).normalized();
        assert_eq!(q.page, 1);
        assert_eq!(q.per_page, MAX_PER_PAGE);

        let q = ProductQuery::new().with_pagination(3, 0).normalized();
        assert_eq!(q.per_page, DEFAULT_PER_PAGE);
        assert_eq!(q.offset(), 48);
    }

    #[test]
    fn test_text_filter_is_case_insensitive() {
        let mut p = product("Kanga Wrap", 20_000);
        p.description = Some("Printed cotton".to_string());
        assert!(ProductQuery::new().with_text("kanga").normalized().matches(&p, None));
        assert!(ProductQuery::new().with_text("COTTON").normalized().matches(&p, None));
        assert!(!ProductQuery::new().with_text("silk").normalized().matches(&p, None));
    }

    #[test]
    fn test_price_range_uses_effective_price() {
        let mut p = product("Mug", 10_000);
        p.sale_price = Some(Money::tzs(7_000));
        let q = ProductQuery::new().with_price_range(Some(5_000), Some(8_000));
        assert!(q.matches(&p, None));
        let q = ProductQuery::new().with_price_range(Some(9_000), None);
        assert!(!q.matches(&p, None));
    }

    #[test]
    fn test_hidden_products_excluded() {
        let mut p = product("Draft", 1_000);
        p.status = ProductStatus::Draft;
        let mut q = ProductQuery::new();
        assert!(!q.matches(&p, None));
        q.include_hidden = true;
        assert!(q.matches(&p, None));
    }

    #[test]
    fn test_category_and_stock_filters() {
        let mut p = product("Shirt", 1_000);
        let q = ProductQuery::new().with_category("clothing");
        assert!(q.matches(&p, Some("clothing")));
        assert!(!q.matches(&p, Some("shoes")));
        assert!(!q.matches(&p, None));

        p.stock = 0;
        let q = ProductQuery {
            in_stock: Some(true),
            ..ProductQuery::new()
        };
        assert!(!q.matches(&p, None));
    }

    #[test]
    fn test_sorting() {
        let mut a = product("Alpha", 3_000);
        let mut b = product("Bravo", 1_000);
        let c = product("Charlie", 2_000);
        a.created_at = Utc::now() - Duration::days(2);
        b.created_at = Utc::now() - Duration::days(1);
        let mut items = vec![a, b, c];

        SortOption::PriceAsc.sort(&mut items);
        let names: Vec<_> = items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Bravo", "Charlie", "Alpha"]);

        SortOption::Newest.sort(&mut items);
        assert_eq!(items[0].name, "Charlie");

        SortOption::NameDesc.sort(&mut items);
        assert_eq!(items[0].name, "Charlie");
    }

    #[test]
    fn test_page_math() {
        let q = ProductQuery::new().with_pagination(2, 2).normalized();
        let page = Page::from_slice(vec![1, 2, 3, 4, 5], &q);
        assert_eq!(page.items, vec![3, 4]);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_sort_deserializes_snake_case() {
        let sort: SortOption = serde_json::from_str("\"price_desc\"").unwrap();
        assert_eq!(sort, SortOption::PriceDesc);
    }
}
