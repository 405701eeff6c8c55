//! Product route handlers.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use bizoe_core::{Catalog, Category, CategoryId, Money, Product, ProductId, ProductQuery};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use super::Page;
use crate::error::{AppError, Result};
use crate::middleware::RequestLocale;
use crate::state::AppState;

/// Product display data.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub brand: String,
    pub price: Decimal,
    pub price_display: String,
    pub original_price: Option<Decimal>,
    pub original_price_display: Option<String>,
    pub savings_percent: Option<u32>,
    pub category: Option<String>,
    pub images: Vec<String>,
    pub in_stock: bool,
    pub stock_quantity: u32,
    pub featured: bool,
}

impl ProductView {
    #[must_use]
    pub fn new(product: &Product, catalog: &Catalog) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            brand: product.brand.clone(),
            price: product.price,
            price_display: product.unit_price().to_string(),
            original_price: product.original_price,
            original_price_display: product
                .original_price
                .map(|price| Money::new(price, product.currency).to_string()),
            savings_percent: product.savings_percent(),
            category: catalog
                .category(product.category_id)
                .map(|category| category.slug.clone()),
            images: product.images.clone(),
            in_stock: product.is_available(),
            stock_quantity: product.stock_quantity,
            featured: product.featured,
        }
    }

    #[must_use]
    pub fn list<'a>(products: impl IntoIterator<Item = &'a Product>, catalog: &Catalog) -> Vec<Self> {
        products
            .into_iter()
            .map(|product| Self::new(product, catalog))
            .collect()
    }
}

/// Category display data.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub id: CategoryId,
    pub slug: String,
    pub name_key: String,
    pub description_key: String,
    pub image: String,
    pub product_count: usize,
}

impl CategoryView {
    #[must_use]
    pub fn new(category: &Category, catalog: &Catalog) -> Self {
        Self {
            id: category.id,
            slug: category.slug.clone(),
            name_key: category.name_key.clone(),
            description_key: category.description_key.clone(),
            image: category.image.clone(),
            product_count: catalog.product_count(category.id),
        }
    }

    #[must_use]
    pub fn all(catalog: &Catalog) -> Vec<Self> {
        catalog
            .categories()
            .iter()
            .map(|category| Self::new(category, catalog))
            .collect()
    }
}

/// Product listing payload.
#[derive(Debug, Serialize)]
pub struct ProductListing {
    pub query: ProductQuery,
    pub total: usize,
    /// True when the filters matched nothing.
    pub no_results: bool,
    pub products: Vec<ProductView>,
}

/// Product detail payload.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub product: ProductView,
    pub specifications: BTreeMap<String, String>,
    pub related: Vec<ProductView>,
}

/// Categories payload.
#[derive(Debug, Serialize)]
pub struct CategoryListing {
    pub categories: Vec<CategoryView>,
}

/// Display the product listing.
///
/// # Errors
///
/// Returns 400 if a price or stock filter cannot be parsed.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    query: std::result::Result<Query<ProductQuery>, QueryRejection>,
) -> Result<Json<Page<ProductListing>>> {
    let Query(query) = query?;
    let catalog = state.catalog();
    let products = ProductView::list(catalog.search(&query), catalog);
    tracing::debug!(matches = products.len(), "Product search");

    Ok(Json(Page::new(
        locale,
        "商品目錄 - BIZOE",
        ProductListing {
            query,
            total: products.len(),
            no_results: products.is_empty(),
            products,
        },
    )))
}

/// Display a product.
///
/// # Errors
///
/// Returns 404 if the id is malformed or no product has it.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(id): Path<String>,
) -> Result<Json<Page<ProductDetail>>> {
    let catalog = state.catalog();
    let product = id
        .parse::<ProductId>()
        .ok()
        .and_then(|id| catalog.product(id))
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(Page::new(
        locale,
        "商品詳情 - BIZOE",
        ProductDetail {
            product: ProductView::new(product, catalog),
            specifications: product.specifications.clone(),
            related: ProductView::list(catalog.related(product), catalog),
        },
    )))
}

/// Display the categories with their product counts.
#[instrument(skip(state))]
pub async fn categories(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> Json<Page<CategoryListing>> {
    Json(Page::new(
        locale,
        "商品分類 - BIZOE",
        CategoryListing {
            categories: CategoryView::all(state.catalog()),
        },
    ))
}
