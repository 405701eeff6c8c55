//! Application state shared across handlers.

use std::sync::Arc;

use bizoe_core::{Catalog, PricingRules};

use crate::config::StorefrontConfig;
use crate::services::{
    AuthService, ContactService, MockAuthService, MockContactService, MockOrderService,
    OrderService,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog, the pricing rules and the backing services. Per-client state
/// (cart, auth) lives in the session, never here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    pricing: PricingRules,
    auth: Arc<dyn AuthService>,
    orders: Arc<dyn OrderService>,
    contact: Arc<dyn ContactService>,
}

/// The service ports the handlers call.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub orders: Arc<dyn OrderService>,
    pub contact: Arc<dyn ContactService>,
}

impl Services {
    /// Mock services with the latencies from `config`.
    #[must_use]
    pub fn mock(config: &StorefrontConfig) -> Self {
        Self {
            auth: Arc::new(MockAuthService::new(&config.latency)),
            orders: Arc::new(MockOrderService::new(config.latency.checkout)),
            contact: Arc::new(MockContactService::new(config.latency.contact)),
        }
    }
}

impl AppState {
    /// Create application state backed by the mock services.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `catalog` - Product catalog served by the store
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Catalog) -> Self {
        let services = Services::mock(&config);
        Self::with_services(config, catalog, services)
    }

    /// Create application state with explicit service implementations.
    #[must_use]
    pub fn with_services(config: StorefrontConfig, catalog: Catalog, services: Services) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                pricing: PricingRules::default(),
                auth: services.auth,
                orders: services.orders,
                contact: services.contact,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn pricing(&self) -> &PricingRules {
        &self.inner.pricing
    }

    #[must_use]
    pub fn auth(&self) -> &dyn AuthService {
        self.inner.auth.as_ref()
    }

    #[must_use]
    pub fn orders(&self) -> &dyn OrderService {
        self.inner.orders.as_ref()
    }

    #[must_use]
    pub fn contact(&self) -> &dyn ContactService {
        self.inner.contact.as_ref()
    }
}
