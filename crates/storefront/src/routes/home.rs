//! Home page route handler.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use super::Page;
use super::products::{CategoryView, ProductView};
use crate::middleware::RequestLocale;
use crate::state::AppState;

/// A call-to-action on the landing hero.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HeroAction {
    /// Translation key for the button label.
    pub label_key: &'static str,
    pub href: &'static str,
}

/// Landing hero content.
#[derive(Debug, Clone, Serialize)]
pub struct Hero {
    pub title_key: &'static str,
    pub subtitle_key: &'static str,
    pub actions: [HeroAction; 2],
}

impl Default for Hero {
    fn default() -> Self {
        Self {
            title_key: "home.hero.title",
            subtitle_key: "home.hero.subtitle",
            actions: [
                HeroAction {
                    label_key: "home.hero.shopNow",
                    href: "/products",
                },
                HeroAction {
                    label_key: "home.hero.contactUs",
                    href: "/contact",
                },
            ],
        }
    }
}

/// Landing page payload.
#[derive(Debug, Serialize)]
pub struct HomeView {
    pub hero: Hero,
    pub featured_products: Vec<ProductView>,
    pub categories: Vec<CategoryView>,
}

/// Display the home page.
#[instrument(skip(state))]
pub async fn home(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> Json<Page<HomeView>> {
    let catalog = state.catalog();
    Json(Page::new(
        locale,
        "BIZOE - Professional 3D Printers & Equipment",
        HomeView {
            hero: Hero::default(),
            featured_products: ProductView::list(catalog.featured(), catalog),
            categories: CategoryView::all(catalog),
        },
    ))
}
