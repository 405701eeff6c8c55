//! Cart store: the cart reducer over a persisted snapshot.
//!
//! Every operation loads the client's snapshot, applies one reducer step and
//! writes the snapshot back before returning it.

use bizoe_core::{
    Cart, CartError, CartTotals, Catalog, PricingRules, ProductId, PromoCode, PromoError,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::session_keys;
use crate::storage::{SnapshotStore, StorageError};

/// Errors from cart store operations.
#[derive(Debug, Error)]
pub enum CartServiceError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Promo(#[from] PromoError),

    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Persisted cart state: the cart itself plus the applied promo code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub cart: Option<Cart>,
    pub promo: Option<PromoCode>,
}

impl CartSnapshot {
    /// Price the current items.
    #[must_use]
    pub fn totals(&self, rules: &PricingRules) -> CartTotals {
        self.cart.as_ref().map_or_else(CartTotals::empty, |cart| {
            rules.totals(cart.items(), self.promo)
        })
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart.as_ref().map_or(0, Cart::total_items)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.as_ref().is_none_or(Cart::is_empty)
    }
}

/// Cart operations for one client.
pub struct CartStore<'a, S> {
    store: &'a S,
    catalog: &'a Catalog,
}

impl<'a, S: SnapshotStore> CartStore<'a, S> {
    /// Create a cart store over a client's snapshot storage.
    #[must_use]
    pub const fn new(store: &'a S, catalog: &'a Catalog) -> Self {
        Self { store, catalog }
    }

    /// Current snapshot; empty when nothing was stored yet.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the snapshot cannot be read.
    pub async fn snapshot(&self) -> Result<CartSnapshot, CartServiceError> {
        Ok(self
            .store
            .load::<CartSnapshot>(session_keys::CART)
            .await?
            .unwrap_or_default())
    }

    async fn persist(&self, snapshot: &CartSnapshot) -> Result<(), CartServiceError> {
        self.store.save(session_keys::CART, snapshot).await?;
        Ok(())
    }

    /// Add `quantity` units of a catalog product, creating the cart on first
    /// add.
    ///
    /// # Errors
    ///
    /// `ProductNotFound` for unknown products, `Cart` when the reducer
    /// rejects the quantity or stock, `Storage` on persistence failure.
    pub async fn add_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartSnapshot, CartServiceError> {
        let product = self
            .catalog
            .product(product_id)
            .ok_or(CartServiceError::ProductNotFound(product_id))?;

        let now = Utc::now();
        let mut snapshot = self.snapshot().await?;
        let cart = snapshot.cart.get_or_insert_with(|| Cart::new(now));
        let new_quantity = cart.add_item(product, quantity, now)?;
        self.persist(&snapshot).await?;

        tracing::info!(product_id = %product_id, quantity = new_quantity, "Added to cart");
        Ok(snapshot)
    }

    /// Set a line's quantity; zero or below removes it, even for a product
    /// no longer in the catalog.
    ///
    /// # Errors
    ///
    /// `ProductNotFound` for unknown products, `Cart(ItemNotFound)` when the
    /// product is not in the cart, `Storage` on persistence failure.
    pub async fn update_quantity(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartSnapshot, CartServiceError> {
        if quantity <= 0 {
            return self.remove_item(product_id).await;
        }

        let product = self
            .catalog
            .product(product_id)
            .ok_or(CartServiceError::ProductNotFound(product_id))?;

        let mut snapshot = self.snapshot().await?;
        let cart = snapshot
            .cart
            .as_mut()
            .ok_or(CartError::ItemNotFound(product_id))?;
        let result = cart.set_quantity(product, quantity, Utc::now())?;
        self.persist(&snapshot).await?;

        tracing::info!(product_id = %product_id, quantity = ?result, "Updated cart quantity");
        Ok(snapshot)
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// `Cart(ItemNotFound)` when the product is not in the cart, `Storage`
    /// on persistence failure.
    pub async fn remove_item(&self, product_id: ProductId) -> Result<CartSnapshot, CartServiceError> {
        let mut snapshot = self.snapshot().await?;
        let cart = snapshot
            .cart
            .as_mut()
            .ok_or(CartError::ItemNotFound(product_id))?;
        cart.remove_item(product_id, Utc::now())?;
        self.persist(&snapshot).await?;

        tracing::info!(product_id = %product_id, "Removed from cart");
        Ok(snapshot)
    }

    /// Drop the cart and any applied promo.
    ///
    /// # Errors
    ///
    /// Returns `Storage` on persistence failure.
    pub async fn clear(&self) -> Result<(), CartServiceError> {
        self.store.remove(session_keys::CART).await?;
        tracing::info!("Cart cleared");
        Ok(())
    }

    /// Apply a promo code from user input.
    ///
    /// An unknown code leaves any previously applied code in place.
    ///
    /// # Errors
    ///
    /// `Promo` for blank or unknown codes, `Storage` on persistence failure.
    pub async fn apply_promo(&self, input: &str) -> Result<CartSnapshot, CartServiceError> {
        let code = input.parse::<PromoCode>().inspect_err(|e| {
            tracing::info!(error = %e, "Rejected promo code");
        })?;

        let mut snapshot = self.snapshot().await?;
        snapshot.promo = Some(code);
        self.persist(&snapshot).await?;

        tracing::info!(promo = %code, "Applied promo code");
        Ok(snapshot)
    }

    /// Remove the applied promo code, if any.
    ///
    /// # Errors
    ///
    /// Returns `Storage` on persistence failure.
    pub async fn remove_promo(&self) -> Result<CartSnapshot, CartServiceError> {
        let mut snapshot = self.snapshot().await?;
        if snapshot.promo.take().is_some() {
            self.persist(&snapshot).await?;
        }
        Ok(snapshot)
    }
}
