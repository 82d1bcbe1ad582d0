//! Type-safe price representation using decimal arithmetic.
//!
//! Cart math (extended prices, tax, shipping) is done on [`Decimal`] so that
//! `0.1 + 0.2` style drift never reaches a displayed total.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in US dollars.
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// The amount rounded to cents, halves away from zero.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        round_cents(self.amount)
    }

    /// Whether the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Format for display (e.g., "$1,299.99").
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self.rounded();
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = format!("{:.2}", rounded.abs());
        let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
        format!(
            "{sign}{}{}.{cents}",
            self.currency_code.symbol(),
            group_thousands(whole)
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Round a money amount to cents, halves away from zero.
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn group_thousands(whole: &str) -> String {
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// ISO 4217 currency codes the store prices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
}

impl CurrencyCode {
    /// Symbol printed before the amount.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD => "$",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(num: i64, scale: u32) -> Price {
        Price::usd(Decimal::new(num, scale))
    }

    #[test]
    fn test_display_pads_cents() {
        assert_eq!(usd(50, 0).display(), "$50.00");
        assert_eq!(usd(999, 2).display(), "$9.99");
        assert_eq!(usd(0, 0).display(), "$0.00");
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(usd(129_999, 2).display(), "$1,299.99");
        assert_eq!(usd(1_000_000, 0).display(), "$1,000,000.00");
        assert_eq!(usd(100_000, 0).display(), "$100,000.00");
    }

    #[test]
    fn test_display_rounds_half_away_from_zero() {
        assert_eq!(usd(10_005, 3).display(), "$10.01");
        assert_eq!(usd(10_004, 3).display(), "$10.00");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(usd(-1_250, 2).display(), "-$12.50");
    }
}
