//! Orders, addresses and payment methods.

use core::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::CartItem;
use crate::pricing::{CartTotals, PromoCode};
use crate::types::{Email, OrderId, OrderStatus, PaymentStatus, ProductId, UserId};
use crate::validation::ValidationErrors;

/// Country used when an address does not name one.
pub const DEFAULT_COUNTRY: &str = "US";

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

/// A shipping or billing address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub apartment: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

impl Address {
    /// Check required fields, prefixing error keys with `prefix.`.
    ///
    /// Everything except `apartment` is required and the email must parse.
    #[must_use]
    pub fn validate(&self, prefix: &str) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let key = |field: &str| format!("{prefix}.{field}");

        for (field, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip_code", &self.zip_code),
            ("country", &self.country),
        ] {
            errors.require(&key(field), value);
        }

        if !self.email.trim().is_empty() {
            if let Err(err) = Email::parse(&self.email) {
                errors.add(&key("email"), err.to_string());
            }
        }
        errors
    }
}

/// Kinds of saved payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    CreditCard,
    Paypal,
    ApplePay,
}

/// A payment method on file for the mock checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentMethod {
    pub id: &'static str,
    pub kind: PaymentMethodKind,
    pub label: &'static str,
    pub last4: Option<&'static str>,
}

/// Payment methods every mock account has on file.
pub const SAVED_PAYMENT_METHODS: [PaymentMethod; 4] = [
    PaymentMethod {
        id: "visa_4242",
        kind: PaymentMethodKind::CreditCard,
        label: "Visa",
        last4: Some("4242"),
    },
    PaymentMethod {
        id: "mastercard_5555",
        kind: PaymentMethodKind::CreditCard,
        label: "Mastercard",
        last4: Some("5555"),
    },
    PaymentMethod {
        id: "paypal",
        kind: PaymentMethodKind::Paypal,
        label: "PayPal",
        last4: None,
    },
    PaymentMethod {
        id: "apple_pay",
        kind: PaymentMethodKind::ApplePay,
        label: "Apple Pay",
        last4: None,
    },
];

impl PaymentMethod {
    /// Look up a saved method by id.
    #[must_use]
    pub fn find(id: &str) -> Option<Self> {
        SAVED_PAYMENT_METHODS.into_iter().find(|m| m.id == id)
    }
}

/// Human-facing order reference, `BIZOE-YYYYMMDD-XXXXXXXX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    pub const PREFIX: &'static str = "BIZOE";

    /// Build an order number from the order date and a random suffix.
    #[must_use]
    pub fn generate(now: DateTime<Utc>, nonce: Uuid) -> Self {
        let simple = nonce.simple().to_string().to_uppercase();
        let suffix = simple.get(..8).unwrap_or(&simple);
        Self(format!(
            "{}-{}-{suffix}",
            Self::PREFIX,
            now.format("%Y%m%d")
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
    pub total: Decimal,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name.clone(),
            quantity: item.quantity,
            price: item.price,
            total: item.line_total(),
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub number: OrderNumber,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub items: Vec<OrderItem>,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub payment_method: String,
    pub promo: Option<PromoCode>,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to place an order, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub payment_method: String,
    pub totals: CartTotals,
}

impl NewOrder {
    /// Materialize the order once the payment has gone through.
    #[must_use]
    pub fn into_order(self, id: OrderId, number: OrderNumber, now: DateTime<Utc>) -> Order {
        Order {
            id,
            number,
            user_id: self.user_id,
            status: OrderStatus::Confirmed,
            payment_status: PaymentStatus::Paid,
            items: self.items,
            shipping_address: self.shipping_address,
            billing_address: self.billing_address,
            payment_method: self.payment_method,
            promo: self.totals.promo,
            subtotal: self.totals.subtotal,
            shipping: self.totals.shipping,
            tax: self.totals.tax,
            discount: self.totals.discount,
            total: self.totals.total,
            created_at: now,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn address() -> Address {
        Address {
            first_name: "Mei".to_string(),
            last_name: "Lin".to_string(),
            email: "maker@example.com".to_string(),
            phone: "+886 912 345 678".to_string(),
            address: "No. 7, Section 5, Xinyi Rd".to_string(),
            apartment: None,
            city: "Taipei".to_string(),
            state: "Xinyi".to_string(),
            zip_code: "110".to_string(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }

    #[test]
    fn test_complete_address_is_valid() {
        assert!(address().validate("shipping").is_empty());
    }

    #[test]
    fn test_missing_fields_are_reported_with_prefix() {
        let mut incomplete = address();
        incomplete.city = String::new();
        incomplete.zip_code = "  ".to_string();
        let errors = incomplete.validate("shipping");
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["shipping.city", "shipping.zip_code"]
        );
    }

    #[test]
    fn test_malformed_email_is_reported() {
        let mut bad = address();
        bad.email = "maker-at-example".to_string();
        let errors = bad.validate("billing");
        assert!(errors.get("billing.email").is_some());
    }

    #[test]
    fn test_country_defaults_to_us() {
        let parsed: Address = serde_json::from_str(r#"{"first_name":"Mei"}"#).unwrap();
        assert_eq!(parsed.country, "US");
    }

    #[test]
    fn test_order_number_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let nonce = Uuid::parse_str("1b4e28ba-2fa1-11d2-883f-0016d3cca427").unwrap();
        let number = OrderNumber::generate(now, nonce);
        assert_eq!(number.as_str(), "BIZOE-20240309-1B4E28BA");
    }

    #[test]
    fn test_payment_method_lookup() {
        assert_eq!(
            PaymentMethod::find("visa_4242").unwrap().last4,
            Some("4242")
        );
        assert!(PaymentMethod::find("bitcoin").is_none());
    }
}
