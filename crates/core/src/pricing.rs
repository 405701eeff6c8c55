//! Cart pricing: shipping, tax and promo discounts.
//!
//! All arithmetic is exact decimal. Nothing is rounded here; round with
//! [`crate::round_cents`] or [`crate::Money::display`] when presenting.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartItem;

/// Errors raised when resolving a promo code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromoError {
    #[error("promo code is empty")]
    Empty,

    #[error("invalid promo code: {0}")]
    Unknown(String),
}

/// A code from the static allow-list of percentage discounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromoCode {
    #[serde(rename = "WELCOME10")]
    Welcome10,
    #[serde(rename = "SAVE15")]
    Save15,
    #[serde(rename = "NEWUSER")]
    NewUser,
    #[serde(rename = "BIZOE2024")]
    Bizoe2024,
}

impl PromoCode {
    pub const ALL: [Self; 4] = [Self::Welcome10, Self::Save15, Self::NewUser, Self::Bizoe2024];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Welcome10 => "WELCOME10",
            Self::Save15 => "SAVE15",
            Self::NewUser => "NEWUSER",
            Self::Bizoe2024 => "BIZOE2024",
        }
    }

    /// Discount percentage.
    #[must_use]
    pub const fn percent(self) -> u32 {
        match self {
            Self::Welcome10 => 10,
            Self::Save15 => 15,
            Self::NewUser => 20,
            Self::Bizoe2024 => 25,
        }
    }

    /// `subtotal * percent / 100`.
    #[must_use]
    pub fn discount(self, subtotal: Decimal) -> Decimal {
        subtotal * Decimal::from(self.percent()) / Decimal::ONE_HUNDRED
    }
}

impl FromStr for PromoCode {
    type Err = PromoError;

    /// Case-insensitive lookup; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(PromoError::Empty);
        }
        Self::ALL
            .into_iter()
            .find(|code| code.code() == normalized)
            .ok_or(PromoError::Unknown(normalized))
    }
}

impl fmt::Display for PromoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Fixed business rules for shipping and tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingRules {
    /// Subtotals at or above this ship free.
    pub free_shipping_threshold: Decimal,
    pub flat_shipping_fee: Decimal,
    pub tax_rate: Decimal,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Decimal::ONE_HUNDRED,
            flat_shipping_fee: Decimal::new(999, 2),
            tax_rate: Decimal::new(8, 2),
        }
    }
}

impl PricingRules {
    #[must_use]
    pub fn shipping(&self, subtotal: Decimal) -> Decimal {
        if subtotal >= self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.flat_shipping_fee
        }
    }

    #[must_use]
    pub fn tax(&self, subtotal: Decimal) -> Decimal {
        subtotal * self.tax_rate
    }

    /// Price a set of cart lines.
    ///
    /// An empty cart short-circuits to all-zero totals flagged `empty`, so no
    /// shipping fee is charged on nothing.
    #[must_use]
    pub fn totals(&self, items: &[CartItem], promo: Option<PromoCode>) -> CartTotals {
        if items.is_empty() {
            return CartTotals::empty();
        }

        let subtotal: Decimal = items.iter().map(CartItem::line_total).sum();
        let shipping = self.shipping(subtotal);
        let tax = self.tax(subtotal);
        let discount = promo.map_or(Decimal::ZERO, |code| code.discount(subtotal));

        CartTotals {
            item_count: items.iter().map(|item| item.quantity).sum(),
            subtotal,
            shipping,
            tax,
            discount,
            total: subtotal + shipping + tax - discount,
            promo,
            empty: false,
        }
    }
}

/// Computed totals for a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub item_count: u32,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub promo: Option<PromoCode>,
    pub empty: bool,
}

impl CartTotals {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            item_count: 0,
            subtotal: Decimal::ZERO,
            shipping: Decimal::ZERO,
            tax: Decimal::ZERO,
            discount: Decimal::ZERO,
            total: Decimal::ZERO,
            promo: None,
            empty: true,
        }
    }

    #[must_use]
    pub fn free_shipping(&self) -> bool {
        !self.empty && self.shipping.is_zero()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::round_cents;
    use crate::types::ProductId;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(id: i32, price: &str, quantity: u32) -> CartItem {
        CartItem {
            id: format!("{id}-0"),
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            image: None,
            quantity,
            price: dec(price),
        }
    }

    #[test]
    fn test_reference_cart() {
        let rules = PricingRules::default();
        let totals = rules.totals(&[line(5, "29.99", 2), line(1, "899.99", 1)], None);

        assert_eq!(totals.subtotal, dec("959.97"));
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.tax, dec("76.7976"));
        assert_eq!(round_cents(totals.tax), dec("76.80"));
        assert_eq!(totals.discount, Decimal::ZERO);
        assert_eq!(round_cents(totals.total), dec("1036.77"));
        assert_eq!(totals.item_count, 3);
        assert!(totals.free_shipping());
    }

    #[test]
    fn test_shipping_boundary() {
        let rules = PricingRules::default();
        assert_eq!(rules.shipping(dec("100.00")), Decimal::ZERO);
        assert_eq!(rules.shipping(dec("99.99")), dec("9.99"));
        assert_eq!(rules.shipping(dec("100.01")), Decimal::ZERO);

        let totals = rules.totals(&[line(11, "19.99", 1)], None);
        assert_eq!(totals.shipping, dec("9.99"));
        assert_eq!(totals.total, dec("19.99") + dec("9.99") + dec("1.5992"));
    }

    #[test]
    fn test_empty_cart_short_circuits() {
        let totals = PricingRules::default().totals(&[], Some(PromoCode::Save15));
        assert!(totals.empty);
        assert_eq!(totals.total, Decimal::ZERO);
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert!(!totals.free_shipping());
    }

    #[test]
    fn test_promo_discount() {
        let rules = PricingRules::default();
        let items = [line(5, "29.99", 2), line(1, "899.99", 1)];
        let totals = rules.totals(&items, Some(PromoCode::Bizoe2024));

        assert_eq!(totals.discount, dec("239.9925"));
        assert_eq!(
            totals.total,
            dec("959.97") + dec("76.7976") - dec("239.9925")
        );
        assert_eq!(totals.promo, Some(PromoCode::Bizoe2024));
    }

    #[test]
    fn test_promo_percentages() {
        let subtotal = dec("200");
        assert_eq!(PromoCode::Welcome10.discount(subtotal), dec("20"));
        assert_eq!(PromoCode::Save15.discount(subtotal), dec("30"));
        assert_eq!(PromoCode::NewUser.discount(subtotal), dec("40"));
        assert_eq!(PromoCode::Bizoe2024.discount(subtotal), dec("50"));
    }

    #[test]
    fn test_promo_lookup_case_insensitive() {
        assert_eq!("welcome10".parse::<PromoCode>(), Ok(PromoCode::Welcome10));
        assert_eq!(" Save15 ".parse::<PromoCode>(), Ok(PromoCode::Save15));
        assert_eq!("bizoe2024".parse::<PromoCode>(), Ok(PromoCode::Bizoe2024));
    }

    #[test]
    fn test_unknown_promo_is_error() {
        assert_eq!(
            "free100".parse::<PromoCode>(),
            Err(PromoError::Unknown("FREE100".to_string()))
        );
        assert_eq!("  ".parse::<PromoCode>(), Err(PromoError::Empty));
    }

    #[test]
    fn test_promo_serde_uses_code() {
        let json = serde_json::to_string(&PromoCode::NewUser).unwrap();
        assert_eq!(json, "\"NEWUSER\"");
    }
}
