//! Money amounts using decimal arithmetic.
//!
//! Amounts are kept at full precision through every calculation. Rounding to
//! two decimal places happens only when a value is formatted for display.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An amount with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Create a USD amount.
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// Amount rounded to cents, half away from zero.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        round_cents(self.amount)
    }

    /// Format for display, e.g. `$1,036.77`.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self.rounded();
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!(
            "{sign}{}{}",
            self.currency.symbol(),
            group_thousands(rounded.abs())
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Round an amount to two decimal places, half away from zero.
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Render a non-negative, two-place amount with comma thousands separators.
fn group_thousands(amount: Decimal) -> String {
    let text = amount.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{grouped}.{fraction}")
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    TWD,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::TWD => "NT$",
        }
    }

    /// ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::TWD => "TWD",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_cents_half_away_from_zero() {
        assert_eq!(round_cents(dec("76.7976")), dec("76.80"));
        assert_eq!(round_cents(dec("0.005")), dec("0.01"));
        assert_eq!(round_cents(dec("100")).to_string(), "100.00");
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::usd(dec("1036.7676")).display(), "$1,036.77");
        assert_eq!(Money::usd(dec("1234567.5")).display(), "$1,234,567.50");
        assert_eq!(Money::usd(dec("9.99")).display(), "$9.99");
        assert_eq!(Money::usd(Decimal::ZERO).display(), "$0.00");
    }

    #[test]
    fn test_display_negative_and_currency() {
        assert_eq!(Money::usd(dec("-12.5")).display(), "-$12.50");
        assert_eq!(
            Money::new(dec("2999"), CurrencyCode::TWD).display(),
            "NT$2,999.00"
        );
    }

    #[test]
    fn test_serde_amount_as_string() {
        let json = serde_json::to_value(Money::usd(dec("29.99"))).unwrap();
        assert_eq!(json["amount"], "29.99");
        assert_eq!(json["currency"], "USD");
    }
}
