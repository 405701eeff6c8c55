//! Static storefront content: the mock catalog and informational pages.
//!
//! The catalog ships inside the binary (`data/catalog.json`) and is parsed
//! once at startup. Informational pages carry only metadata and the bits of
//! data they list; their copy lives in the client's translation bundles.

use bizoe_core::{Catalog, CatalogError, PricingRules, ProductId};
use rust_decimal::Decimal;
use serde::Serialize;

const CATALOG_JSON: &str = include_str!("../data/catalog.json");

/// Brand whose resins are part of the bundle promotion.
const BUNDLE_PROMOTION_BRAND: &str = "Phrozen";
/// Category slug the promotions page lists.
const MATERIALS_CATEGORY: &str = "materials";
/// Products with more than this many units count as "in stock now".
const READY_STOCK_THRESHOLD: u32 = 10;

/// Parse the bundled catalog.
///
/// # Errors
///
/// Returns `CatalogError` if the bundled document is malformed.
pub fn load_catalog() -> Result<Catalog, CatalogError> {
    let catalog = Catalog::from_json(CATALOG_JSON)?;
    tracing::info!(
        products = catalog.products().len(),
        categories = catalog.categories().len(),
        "Catalog loaded"
    );
    Ok(catalog)
}

/// Informational pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InfoPage {
    About,
    Faq,
    Terms,
    Privacy,
    Shipping,
    Returns,
    Promotions,
    SiteMap,
}

impl InfoPage {
    pub const ALL: [Self; 8] = [
        Self::About,
        Self::Faq,
        Self::Terms,
        Self::Privacy,
        Self::Shipping,
        Self::Returns,
        Self::Promotions,
        Self::SiteMap,
    ];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::About => "about",
            Self::Faq => "faq",
            Self::Terms => "terms",
            Self::Privacy => "privacy",
            Self::Shipping => "shipping",
            Self::Returns => "returns",
            Self::Promotions => "promotions",
            Self::SiteMap => "site-map",
        }
    }

    /// Document title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::About => "關於我們 - BIZOE",
            Self::Faq => "常見問題 FAQ - BIZOE",
            Self::Terms => "服務條款 - BIZOE",
            Self::Privacy => "隱私政策 - BIZOE",
            Self::Shipping => "配送資訊 - BIZOE",
            Self::Returns => "退換貨政策 - BIZOE",
            Self::Promotions => "BIZOE 優惠活動 - 耗材特價 $19.9-$39.9",
            Self::SiteMap => "網站地圖 - BIZOE",
        }
    }

    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|page| page.slug() == slug)
    }
}

/// A running promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Promotion {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub discount_percent: u32,
    pub valid_until: &'static str,
    pub applicable_products: Vec<ProductId>,
}

/// Current promotions, with their product lists resolved against `catalog`.
#[must_use]
pub fn promotions(catalog: &Catalog) -> Vec<Promotion> {
    let materials = catalog
        .category_by_slug(MATERIALS_CATEGORY)
        .map(|category| category.id);

    vec![
        Promotion {
            id: 1,
            title: "Phrozen樹脂3件88折",
            description: "購買任意3件Phrozen樹脂產品，享受88折優惠",
            discount_percent: 12,
            valid_until: "2024-12-31",
            applicable_products: catalog
                .products()
                .iter()
                .filter(|p| {
                    p.brand.contains(BUNDLE_PROMOTION_BRAND) && Some(p.category_id) == materials
                })
                .map(|p| p.id)
                .collect(),
        },
        Promotion {
            id: 2,
            title: "現貨優惠活動",
            description: "指定商品現貨供應，立即發貨",
            discount_percent: 0,
            valid_until: "2024-10-31",
            applicable_products: catalog
                .products()
                .iter()
                .filter(|p| p.stock_quantity > READY_STOCK_THRESHOLD)
                .map(|p| p.id)
                .collect(),
        },
    ]
}

/// Products listed on the promotions page.
#[must_use]
pub fn promotion_products(catalog: &Catalog) -> Vec<ProductId> {
    catalog
        .category_by_slug(MATERIALS_CATEGORY)
        .map(|category| {
            catalog
                .products()
                .iter()
                .filter(|p| p.category_id == category.id)
                .map(|p| p.id)
                .collect()
        })
        .unwrap_or_default()
}

/// Shipping terms shown on the shipping page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShippingPolicy {
    pub free_shipping_threshold: Decimal,
    pub flat_shipping_fee: Decimal,
}

impl From<&PricingRules> for ShippingPolicy {
    fn from(rules: &PricingRules) -> Self {
        Self {
            free_shipping_threshold: rules.free_shipping_threshold,
            flat_shipping_fee: rules.flat_shipping_fee,
        }
    }
}

/// A link on the site map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteMapLink {
    pub name: String,
    pub path: String,
}

/// A titled group of site map links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteMapGroup {
    pub title: &'static str,
    pub links: Vec<SiteMapLink>,
}

fn links(entries: &[(&str, &str)]) -> Vec<SiteMapLink> {
    entries
        .iter()
        .map(|(name, path)| SiteMapLink {
            name: (*name).to_string(),
            path: (*path).to_string(),
        })
        .collect()
}

/// Site map, with the category group generated from the catalog.
#[must_use]
pub fn site_map(catalog: &Catalog) -> Vec<SiteMapGroup> {
    vec![
        SiteMapGroup {
            title: "主要頁面",
            links: links(&[
                ("首頁", "/"),
                ("商品目錄", "/products"),
                ("優惠活動", "/promotions"),
                ("聯絡我們", "/contact"),
                ("關於我們", "/about"),
            ]),
        },
        SiteMapGroup {
            title: "用戶功能",
            links: links(&[
                ("會員登入", "/auth/login"),
                ("註冊帳戶", "/auth/register"),
                ("購物車", "/cart"),
                ("結帳", "/checkout"),
                ("我的帳戶", "/account"),
                ("個人資料", "/account/profile"),
                ("付款方式", "/account/payment-methods"),
                ("訂單記錄", "/account/orders"),
            ]),
        },
        SiteMapGroup {
            title: "產品分類",
            links: catalog
                .categories()
                .iter()
                .map(|category| SiteMapLink {
                    name: category.name_key.clone(),
                    path: format!("/products?category={}", category.slug),
                })
                .collect(),
        },
        SiteMapGroup {
            title: "法律頁面",
            links: links(&[
                ("隱私政策", "/privacy"),
                ("服務條款", "/terms"),
                ("退換貨政策", "/returns"),
                ("配送資訊", "/shipping"),
                ("常見問題", "/faq"),
            ]),
        },
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = load_catalog().unwrap();
        assert_eq!(catalog.categories().len(), 5);
        assert_eq!(catalog.products().len(), 16);
        assert!(!catalog.featured().is_empty());
    }

    #[test]
    fn test_slug_roundtrip() {
        for page in InfoPage::ALL {
            assert_eq!(InfoPage::from_slug(page.slug()), Some(page));
        }
        assert_eq!(InfoPage::from_slug("careers"), None);
    }

    #[test]
    fn test_bundle_promotion_targets_phrozen_materials() {
        let catalog = load_catalog().unwrap();
        let promos = promotions(&catalog);
        let bundle = promos.first().unwrap();
        assert_eq!(bundle.discount_percent, 12);
        assert!(!bundle.applicable_products.is_empty());
        for id in &bundle.applicable_products {
            let product = catalog.product(*id).unwrap();
            assert!(product.brand.contains("Phrozen"));
            assert_eq!(product.category_id, catalog.category_by_slug("materials").unwrap().id);
        }
    }

    #[test]
    fn test_site_map_lists_every_category() {
        let catalog = load_catalog().unwrap();
        let groups = site_map(&catalog);
        let categories = groups.iter().find(|g| g.title == "產品分類").unwrap();
        assert_eq!(categories.links.len(), catalog.categories().len());
        assert!(
            categories
                .links
                .iter()
                .any(|l| l.path == "/products?category=3d-printers")
        );
    }
}
