//! Shopping cart reducer.
//!
//! The cart is plain data plus synchronous mutations. Every mutation
//! recomputes the derived totals and `updated_at`, so `total_amount` always
//! equals the sum of `price * quantity` over the current items. Persistence
//! lives elsewhere; this module never does I/O.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::ProductId;

/// Identifier of the single per-client cart.
pub const LOCAL_CART_ID: &str = "local-cart";

/// Errors raised by cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),

    #[error("product {0} is not in the cart")]
    ItemNotFound(ProductId),
}

/// A line in the cart.
///
/// `price` is captured when the product is first added and is not re-read
/// from the catalog afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub product_id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub price: Decimal,
}

impl CartItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// The per-client cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    id: String,
    items: Vec<CartItem>,
    total_items: u32,
    total_amount: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    /// An empty cart, as created by the first add.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: LOCAL_CART_ID.to_string(),
            items: Vec::new(),
            total_items: 0,
            total_amount: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub const fn total_items(&self) -> u32 {
        self.total_items
    }

    #[must_use]
    pub const fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Add `quantity` units of `product`.
    ///
    /// An existing line is incremented; otherwise a new line is appended with
    /// the product's current price. The resulting quantity never exceeds
    /// the product's stock. Returns the line's new quantity.
    ///
    /// # Errors
    ///
    /// `ZeroQuantity` when `quantity` is 0, `OutOfStock` when the product
    /// cannot be ordered.
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<u32, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }
        if !product.is_available() {
            return Err(CartError::OutOfStock(product.id));
        }

        let stock = product.stock_quantity;
        let new_quantity = if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product.id)
        {
            item.quantity = item.quantity.saturating_add(quantity).min(stock);
            item.quantity
        } else {
            let quantity = quantity.min(stock);
            self.items.push(CartItem {
                id: format!("{}-{}", product.id, now.timestamp_millis()),
                product_id: product.id,
                name: product.name.clone(),
                image: product.primary_image().map(str::to_owned),
                quantity,
                price: product.price,
            });
            quantity
        };

        self.recompute(now);
        Ok(new_quantity)
    }

    /// Remove the line for `product_id`.
    ///
    /// # Errors
    ///
    /// `ItemNotFound` when the product is not in the cart.
    pub fn remove_item(
        &mut self,
        product_id: ProductId,
        now: DateTime<Utc>,
    ) -> Result<CartItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|item| item.product_id == product_id)
            .ok_or(CartError::ItemNotFound(product_id))?;
        let removed = self.items.remove(index);
        self.recompute(now);
        Ok(removed)
    }

    /// Replace the quantity of an existing line.
    ///
    /// Zero or below removes the line, exactly as [`Cart::remove_item`].
    /// Positive quantities are clamped to `[1, stock]`. Returns the new
    /// quantity, or `None` when the line was removed.
    ///
    /// # Errors
    ///
    /// `ItemNotFound` when the product is not in the cart, `OutOfStock` when
    /// a positive quantity is requested for a product that cannot be ordered.
    pub fn set_quantity(
        &mut self,
        product: &Product,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<u32>, CartError> {
        if quantity <= 0 {
            return self.remove_item(product.id, now).map(|_| None);
        }
        if !product.is_available() {
            return Err(CartError::OutOfStock(product.id));
        }

        let item = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product.id)
            .ok_or(CartError::ItemNotFound(product.id))?;
        let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
        item.quantity = requested.clamp(1, product.stock_quantity);
        let new_quantity = item.quantity;

        self.recompute(now);
        Ok(Some(new_quantity))
    }

    fn recompute(&mut self, now: DateTime<Utc>) {
        self.total_items = self.items.iter().map(|item| item.quantity).sum();
        self.total_amount = self.items.iter().map(CartItem::line_total).sum();
        self.updated_at = now;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;
    use std::str::FromStr;

    use chrono::TimeZone;

    use super::*;
    use crate::types::{CategoryId, CurrencyCode};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn product(id: i32, price: &str, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            brand: String::new(),
            price: Decimal::from_str(price).unwrap(),
            original_price: None,
            currency: CurrencyCode::USD,
            category_id: CategoryId::new(1),
            images: vec![format!("https://img.example/{id}.jpg")],
            specifications: BTreeMap::new(),
            in_stock: stock > 0,
            stock_quantity: stock,
            featured: false,
        }
    }

    fn assert_totals_consistent(cart: &Cart) {
        let expected: Decimal = cart
            .items()
            .iter()
            .map(|i| i.price * Decimal::from(i.quantity))
            .sum();
        assert_eq!(cart.total_amount(), expected);
        let count: u32 = cart.items().iter().map(|i| i.quantity).sum();
        assert_eq!(cart.total_items(), count);
    }

    #[test]
    fn test_add_same_product_twice_merges() {
        let resin = product(5, "29.99", 50);
        let mut cart = Cart::new(at(0));
        cart.add_item(&resin, 1, at(1)).unwrap();
        cart.add_item(&resin, 2, at(2)).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.line(resin.id).unwrap().quantity, 3);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.updated_at(), at(2));
        assert_eq!(cart.created_at(), at(0));
    }

    #[test]
    fn test_new_line_captures_price_and_display_fields() {
        let revo = product(1, "899.99", 15);
        let mut cart = Cart::new(at(0));
        cart.add_item(&revo, 1, at(1)).unwrap();

        let line = cart.line(revo.id).unwrap();
        assert_eq!(line.price, Decimal::from_str("899.99").unwrap());
        assert_eq!(line.name, "Product 1");
        assert_eq!(line.image.as_deref(), Some("https://img.example/1.jpg"));
        assert_eq!(line.id, format!("1-{}", at(1).timestamp_millis()));
        assert_eq!(cart.id(), LOCAL_CART_ID);
    }

    #[test]
    fn test_price_snapshot_survives_catalog_change() {
        let mut revo = product(1, "899.99", 15);
        let mut cart = Cart::new(at(0));
        cart.add_item(&revo, 1, at(1)).unwrap();

        revo.price = Decimal::from_str("949.99").unwrap();
        cart.add_item(&revo, 1, at(2)).unwrap();

        assert_eq!(
            cart.line(revo.id).unwrap().price,
            Decimal::from_str("899.99").unwrap()
        );
        assert_eq!(cart.total_amount(), Decimal::from_str("1799.98").unwrap());
    }

    #[test]
    fn test_add_clamps_to_stock() {
        let scanner = product(14, "2999.99", 3);
        let mut cart = Cart::new(at(0));
        assert_eq!(cart.add_item(&scanner, 5, at(1)).unwrap(), 3);
        assert_eq!(cart.add_item(&scanner, 1, at(2)).unwrap(), 3);
    }

    #[test]
    fn test_add_rejects_zero_and_out_of_stock() {
        let mut cart = Cart::new(at(0));
        assert_eq!(
            cart.add_item(&product(1, "10.00", 5), 0, at(1)),
            Err(CartError::ZeroQuantity)
        );
        assert_eq!(
            cart.add_item(&product(2, "10.00", 0), 1, at(1)),
            Err(CartError::OutOfStock(ProductId::new(2)))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_zero_equals_remove() {
        let resin = product(5, "29.99", 50);
        let revo = product(1, "899.99", 15);
        let mut base = Cart::new(at(0));
        base.add_item(&resin, 2, at(1)).unwrap();
        base.add_item(&revo, 1, at(2)).unwrap();

        let mut via_update = base.clone();
        let mut via_remove = base.clone();
        let mut via_negative = base;
        assert_eq!(via_update.set_quantity(&resin, 0, at(3)).unwrap(), None);
        via_remove.remove_item(resin.id, at(3)).unwrap();
        assert_eq!(via_negative.set_quantity(&resin, -4, at(3)).unwrap(), None);

        assert_eq!(via_update, via_remove);
        assert_eq!(via_negative, via_remove);
        assert!(via_update.line(resin.id).is_none());
    }

    #[test]
    fn test_set_quantity_clamps_to_stock() {
        let printer = product(2, "1299.99", 8);
        let mut cart = Cart::new(at(0));
        cart.add_item(&printer, 1, at(1)).unwrap();
        assert_eq!(cart.set_quantity(&printer, 20, at(2)).unwrap(), Some(8));
        assert_eq!(cart.set_quantity(&printer, 4, at(3)).unwrap(), Some(4));
        assert_totals_consistent(&cart);
    }

    #[test]
    fn test_missing_line_is_not_found() {
        let mut cart = Cart::new(at(0));
        let resin = product(5, "29.99", 50);
        assert_eq!(
            cart.remove_item(resin.id, at(1)),
            Err(CartError::ItemNotFound(resin.id))
        );
        assert_eq!(
            cart.set_quantity(&resin, 2, at(1)),
            Err(CartError::ItemNotFound(resin.id))
        );
    }

    #[test]
    fn test_totals_hold_across_mutation_sequence() {
        let products = [
            product(1, "899.99", 15),
            product(5, "29.99", 50),
            product(8, "24.99", 100),
            product(11, "19.99", 60),
        ];
        let mut cart = Cart::new(at(0));
        let mut tick = 0;
        for round in 0..6_u32 {
            for (i, p) in products.iter().enumerate() {
                tick += 1;
                let step = u32::try_from(i).unwrap() + round;
                match step % 4 {
                    0 | 1 => {
                        cart.add_item(p, step % 3 + 1, at(tick)).unwrap();
                    }
                    2 => {
                        let _ = cart.set_quantity(p, i64::from(step % 5) - 1, at(tick));
                    }
                    _ => {
                        let _ = cart.remove_item(p.id, at(tick));
                    }
                }
                assert_totals_consistent(&cart);
            }
        }
    }

    #[test]
    fn test_serde_snapshot() {
        let mut cart = Cart::new(at(0));
        cart.add_item(&product(5, "29.99", 50), 2, at(1)).unwrap();

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["id"], "local-cart");
        assert_eq!(json["total_items"], 2);
        assert_eq!(json["total_amount"], "59.98");

        let restored: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(restored, cart);
    }
}
