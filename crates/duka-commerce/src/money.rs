//! Money type for representing monetary values.
//!
//! Uses an integer count of the currency's minor unit to avoid the
//! floating-point precision issues that plague monetary calculations.
//! Every arithmetic operation is checked; overflow and currency mismatch
//! surface as `None` and are turned into errors by callers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Currency {
    /// Tanzanian shilling.
    #[default]
    TZS,
    /// Kenyan shilling.
    KES,
    /// US dollar.
    USD,
    /// Euro.
    EUR,
}

impl Currency {
    /// Get the currency code (e.g., "TZS").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::TZS => "TZS",
            Currency::KES => "KES",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }

    /// Get the display prefix (e.g., "TSh").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::TZS => "TSh",
            Currency::KES => "KSh",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
        }
    }

    /// Number of decimal places stored in the minor unit.
    ///
    /// Shilling prices are quoted in whole shillings, so they carry none.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::TZS | Currency::KES => 0,
            Currency::USD | Currency::EUR => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "TZS" => Some(Currency::TZS),
            "KES" => Some(Currency::KES),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in the currency's minor unit.
    pub amount: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Shorthand for a shilling amount.
    pub fn tzs(amount: i64) -> Self {
        Self::new(amount, Currency::TZS)
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount < 0
    }

    /// Add another Money value, returning None on currency mismatch or overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount
            .checked_add(other.amount)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Subtract another Money value, returning None on currency mismatch or overflow.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount
            .checked_sub(other.amount)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Multiply by a quantity.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        self.amount
            .checked_mul(factor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Take a percentage expressed in basis points (1/100th of a percent),
    /// rounding half away from zero.
    ///
    /// ```
    /// use duka_commerce::money::Money;
    /// let vat = Money::tzs(250_000).try_percentage_bps(1800).unwrap();
    /// assert_eq!(vat.amount, 45_000);
    /// ```
    pub fn try_percentage_bps(&self, bps: u32) -> Option<Money> {
        let scaled = i128::from(self.amount).checked_mul(i128::from(bps))?;
        let rounded = if scaled >= 0 {
            (scaled + 5_000) / 10_000
        } else {
            (scaled - 5_000) / 10_000
        };
        i64::try_from(rounded)
            .ok()
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Sum an iterator of Money values in one currency.
    pub fn try_sum<'a>(
        mut iter: impl Iterator<Item = &'a Money>,
        currency: Currency,
    ) -> Option<Money> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }

    /// Format the amount with thousands separators, without the symbol.
    pub fn display_amount(&self) -> String {
        let places = self.currency.decimal_places();
        let divisor = 10_i64.pow(places);
        let whole = (self.amount / divisor).unsigned_abs();
        let frac = (self.amount % divisor).unsigned_abs();

        let digits = whole.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if self.amount < 0 { "-" } else { "" };
        if places == 0 {
            format!("{sign}{grouped}")
        } else {
            format!("{sign}{grouped}.{frac:0width$}", width = places as usize)
        }
    }

    /// Format as a display string (e.g., "TSh 250,000").
    pub fn display(&self) -> String {
        format!("{} {}", self.currency.symbol(), self.display_amount())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display() {
        assert_eq!(Money::tzs(250_000).display(), "TSh 250,000");
        assert_eq!(Money::tzs(999).display(), "TSh 999");
        assert_eq!(Money::tzs(-1_500).display_amount(), "-1,500");
        assert_eq!(Money::new(4999, Currency::USD).display(), "$ 49.99");
        assert_eq!(Money::new(100_005, Currency::USD).display_amount(), "1,000.05");
    }

    #[test]
    fn test_money_addition() {
        let c = Money::tzs(1000).try_add(&Money::tzs(500)).unwrap();
        assert_eq!(c.amount, 1500);
    }

    #[test]
    fn test_money_currency_mismatch() {
        let tzs = Money::tzs(1000);
        let usd = Money::new(1000, Currency::USD);
        assert!(tzs.try_add(&usd).is_none());
        assert!(tzs.try_subtract(&usd).is_none());
    }

    #[test]
    fn test_money_overflow_is_detected() {
        assert!(Money::tzs(i64::MAX).try_add(&Money::tzs(1)).is_none());
        assert!(Money::tzs(i64::MAX).try_multiply(2).is_none());
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 18% of 1,003 = 180.54 -> 181
        assert_eq!(Money::tzs(1003).try_percentage_bps(1800).unwrap().amount, 181);
        // 18% of 1,000 = 180
        assert_eq!(Money::tzs(1000).try_percentage_bps(1800).unwrap().amount, 180);
        assert_eq!(Money::tzs(0).try_percentage_bps(1800).unwrap().amount, 0);
    }

    #[test]
    fn test_try_sum() {
        let values = [Money::tzs(200_000), Money::tzs(50_000)];
        let total = Money::try_sum(values.iter(), Currency::TZS).unwrap();
        assert_eq!(total.amount, 250_000);

        let empty: [Money; 0] = [];
        assert!(Money::try_sum(empty.iter(), Currency::TZS).unwrap().is_zero());
    }

    #[test]
    fn test_money_ordering() {
        let mut prices = vec![Money::tzs(50_000), Money::tzs(12_000), Money::tzs(30_000)];
        prices.sort();
        assert_eq!(prices, vec![Money::tzs(12_000), Money::tzs(30_000), Money::tzs(50_000)]);
        assert_eq!(prices.iter().max(), Some(&Money::tzs(50_000)));
        // Currencies order before amounts.
        assert!(Money::tzs(1_000_000) < Money::new(1, Currency::KES));
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("TZS"), Some(Currency::TZS));
        assert_eq!(Currency::from_code(" usd "), Some(Currency::USD));
        assert_eq!(Currency::from_code("INVALID"), None);
    }
}
