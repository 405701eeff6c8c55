//! Informational page route handlers.
//!
//! Copy for these pages lives in the client's translation bundles, so most
//! of them only describe themselves. Promotions, shipping and the site map
//! also carry the data they list.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use super::Page;
use super::products::ProductView;
use crate::content::{self, InfoPage, Promotion, ShippingPolicy, SiteMapGroup};
use crate::i18n::Locale;
use crate::middleware::RequestLocale;
use crate::state::AppState;

/// Informational page payload.
#[derive(Debug, Serialize)]
pub struct InfoPageView<T> {
    pub page: InfoPage,
    #[serde(flatten)]
    pub data: T,
}

/// Pages with nothing beyond their metadata.
#[derive(Debug, Serialize)]
pub struct NoData {}

/// Promotions page data.
#[derive(Debug, Serialize)]
pub struct PromotionsData {
    pub promotions: Vec<Promotion>,
    pub products: Vec<ProductView>,
}

/// Shipping page data.
#[derive(Debug, Serialize)]
pub struct ShippingData {
    pub policy: ShippingPolicy,
}

/// Site map data.
#[derive(Debug, Serialize)]
pub struct SiteMapData {
    pub groups: Vec<SiteMapGroup>,
}

/// Wrap page data with its metadata.
fn info_page<T>(locale: Locale, page: InfoPage, data: T) -> Json<Page<InfoPageView<T>>> {
    Json(Page::new(locale, page.title(), InfoPageView { page, data }))
}

/// Display the About page.
#[instrument(skip_all)]
pub async fn about(RequestLocale(locale): RequestLocale) -> Json<Page<InfoPageView<NoData>>> {
    info_page(locale, InfoPage::About, NoData {})
}

/// Display the FAQ page.
#[instrument(skip_all)]
pub async fn faq(RequestLocale(locale): RequestLocale) -> Json<Page<InfoPageView<NoData>>> {
    info_page(locale, InfoPage::Faq, NoData {})
}

/// Display the Terms of Service page.
#[instrument(skip_all)]
pub async fn terms(RequestLocale(locale): RequestLocale) -> Json<Page<InfoPageView<NoData>>> {
    info_page(locale, InfoPage::Terms, NoData {})
}

/// Display the Privacy Policy page.
#[instrument(skip_all)]
pub async fn privacy(RequestLocale(locale): RequestLocale) -> Json<Page<InfoPageView<NoData>>> {
    info_page(locale, InfoPage::Privacy, NoData {})
}

/// Display the Returns page.
#[instrument(skip_all)]
pub async fn returns(RequestLocale(locale): RequestLocale) -> Json<Page<InfoPageView<NoData>>> {
    info_page(locale, InfoPage::Returns, NoData {})
}

/// Display the Shipping page.
#[instrument(skip_all)]
pub async fn shipping(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> Json<Page<InfoPageView<ShippingData>>> {
    info_page(
        locale,
        InfoPage::Shipping,
        ShippingData {
            policy: ShippingPolicy::from(state.pricing()),
        },
    )
}

/// Display the Promotions page.
#[instrument(skip_all)]
pub async fn promotions(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> Json<Page<InfoPageView<PromotionsData>>> {
    let catalog = state.catalog();
    let products = content::promotion_products(catalog)
        .into_iter()
        .filter_map(|id| catalog.product(id));

    info_page(
        locale,
        InfoPage::Promotions,
        PromotionsData {
            promotions: content::promotions(catalog),
            products: ProductView::list(products, catalog),
        },
    )
}

/// Display the site map.
#[instrument(skip_all)]
pub async fn site_map(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> Json<Page<InfoPageView<SiteMapData>>> {
    info_page(
        locale,
        InfoPage::SiteMap,
        SiteMapData {
            groups: content::site_map(state.catalog()),
        },
    )
}
