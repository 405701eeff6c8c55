//! Product catalog and the listing query (search, filter, sort).
//!
//! The catalog is immutable once loaded. Queries are pure list
//! transformations over it: no pagination and no caching.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{CategoryId, CurrencyCode, Money, ProductId};

/// Maximum number of related products shown on a product page.
pub const RELATED_PRODUCTS_LIMIT: usize = 4;

/// Errors raised while loading a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("product {product} references unknown category {category}")]
    UnknownCategory {
        product: ProductId,
        category: CategoryId,
    },

    #[error("duplicate product id {0}")]
    DuplicateProduct(ProductId),
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub slug: String,
    /// Translation key for the display name.
    pub name_key: String,
    /// Translation key for the description.
    pub description_key: String,
    pub image: String,
}

/// An immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub brand: String,
    pub price: Decimal,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub currency: CurrencyCode,
    pub category_id: CategoryId,
    pub images: Vec<String>,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    pub in_stock: bool,
    pub stock_quantity: u32,
    #[serde(default)]
    pub featured: bool,
}

impl Product {
    /// Whether at least one unit can be ordered.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.in_stock && self.stock_quantity > 0
    }

    /// Price as a display-ready amount.
    #[must_use]
    pub const fn unit_price(&self) -> Money {
        Money::new(self.price, self.currency)
    }

    /// Percentage off the original price, rounded to a whole number.
    #[must_use]
    pub fn savings_percent(&self) -> Option<u32> {
        let original = self.original_price?;
        if original <= self.price || original.is_zero() {
            return None;
        }
        let pct = ((original - self.price) / original * Decimal::ONE_HUNDRED).round();
        pct.to_u32()
    }

    /// First image, used as the cart thumbnail.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.brand.to_lowercase().contains(needle)
    }
}

/// Sort orders available on the catalog page.
///
/// Deserializing never fails: an unrecognised value sorts as
/// [`SortOrder::Featured`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Featured products first, otherwise catalog order.
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
    /// There is no release date in the catalog; this is a shuffle.
    Newest,
}

impl From<&str> for SortOrder {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "price_asc" | "price_low" => Self::PriceAsc,
            "price_desc" | "price_high" => Self::PriceDesc,
            "name_asc" | "name" => Self::NameAsc,
            "name_desc" => Self::NameDesc,
            "newest" => Self::Newest,
            _ => Self::Featured,
        }
    }
}

impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from(value.as_str()))
    }
}

/// Listing query over the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductQuery {
    /// Case-insensitive substring matched against name, description and brand.
    pub search: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: Option<bool>,
    pub sort: SortOrder,
}

impl ProductQuery {
    fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    fn category_slug(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "all")
    }
}

#[derive(Deserialize)]
struct CatalogData {
    categories: Vec<Category>,
    products: Vec<Product>,
}

/// The product catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog, checking ids are unique and categories resolve.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on duplicate product ids or dangling
    /// category references.
    pub fn new(categories: Vec<Category>, products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = std::collections::HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.id) {
                return Err(CatalogError::DuplicateProduct(product.id));
            }
            if !categories.iter().any(|c| c.id == product.category_id) {
                return Err(CatalogError::UnknownCategory {
                    product: product.id,
                    category: product.category_id,
                });
            }
        }
        Ok(Self {
            categories,
            products,
        })
    }

    /// Parse a catalog from its JSON document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the document is malformed or inconsistent.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;
        Self::new(data.categories, data.products)
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn category_by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    /// Number of products in a category.
    #[must_use]
    pub fn product_count(&self, category: CategoryId) -> usize {
        self.products
            .iter()
            .filter(|p| p.category_id == category)
            .count()
    }

    /// Products flagged for the landing page, in catalog order.
    #[must_use]
    pub fn featured(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.featured).collect()
    }

    /// Other products in the same category, in catalog order.
    #[must_use]
    pub fn related(&self, product: &Product) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.category_id == product.category_id && p.id != product.id)
            .take(RELATED_PRODUCTS_LIMIT)
            .collect()
    }

    /// Run a listing query using the thread-local RNG for shuffles.
    #[must_use]
    pub fn search(&self, query: &ProductQuery) -> Vec<&Product> {
        self.search_with_rng(query, &mut rand::rng())
    }

    /// Run a listing query.
    ///
    /// A category slug that names no category is ignored. An empty result is
    /// a normal outcome, never an error.
    pub fn search_with_rng<R: Rng + ?Sized>(
        &self,
        query: &ProductQuery,
        rng: &mut R,
    ) -> Vec<&Product> {
        let needle = query.search_needle();
        let category = query
            .category_slug()
            .and_then(|slug| self.category_by_slug(slug))
            .map(|category| category.id);

        let mut results: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| needle.as_deref().is_none_or(|n| p.matches_search(n)))
            .filter(|p| category.is_none_or(|id| p.category_id == id))
            .filter(|p| query.min_price.is_none_or(|min| p.price >= min))
            .filter(|p| query.max_price.is_none_or(|max| p.price <= max))
            .filter(|p| query.in_stock != Some(true) || p.is_available())
            .collect();

        sort_products(&mut results, query.sort, rng);
        results
    }
}

fn sort_products<R: Rng + ?Sized>(products: &mut [&Product], order: SortOrder, rng: &mut R) {
    match order {
        // stable: catalog order is kept within each group
        SortOrder::Featured => products.sort_by_key(|p| !p.featured),
        SortOrder::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortOrder::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortOrder::NameAsc => products.sort_by_cached_key(|p| p.name.to_lowercase()),
        SortOrder::NameDesc => {
            products.sort_by_cached_key(|p| p.name.to_lowercase());
            products.reverse();
        }
        SortOrder::Newest => products.shuffle(rng),
    }
}
