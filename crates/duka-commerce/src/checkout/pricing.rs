//! Checkout pricing policy.

use crate::cart::CartSummary;
use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Region that ships free.
pub const DEFAULT_HOME_REGION: &str = "Dar es Salaam";
/// Flat fee for every other region, in shillings.
pub const DEFAULT_FLAT_SHIPPING: i64 = 15_000;
/// 18% VAT.
pub const DEFAULT_TAX_BPS: u32 = 1_800;

/// Shipping and tax rules applied at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub home_region: String,
    pub flat_shipping: Money,
    /// Tax in basis points of the discounted subtotal.
    pub tax_bps: u32,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            home_region: DEFAULT_HOME_REGION.to_string(),
            flat_shipping: Money::tzs(DEFAULT_FLAT_SHIPPING),
            tax_bps: DEFAULT_TAX_BPS,
        }
    }
}

impl PricingPolicy {
    /// Whether a region is the free-shipping home region.
    pub fn is_home_region(&self, region: &str) -> bool {
        region.trim().eq_ignore_ascii_case(self.home_region.trim())
    }

    /// Shipping fee for a region.
    pub fn shipping_for(&self, region: &str) -> Money {
        if self.is_home_region(region) {
            Money::zero(self.flat_shipping.currency)
        } else {
            self.flat_shipping
        }
    }

    /// Price a cart for delivery to `region`.
    pub fn quote(&self, summary: &CartSummary, region: &str) -> Result<PriceBreakdown, CommerceError> {
        let subtotal = summary.original_total;
        let discount = summary.total_discount;
        let taxable = summary.cart_total;
        let shipping = self.shipping_for(region);
        let tax = taxable
            .try_percentage_bps(self.tax_bps)
            .ok_or(CommerceError::Overflow)?;
        let total = subtotal
            .try_subtract(&discount)
            .and_then(|m| m.try_add(&shipping))
            .and_then(|m| m.try_add(&tax))
            .ok_or_else(|| CommerceError::CurrencyMismatch {
                expected: subtotal.currency.code().to_string(),
                got: shipping.currency.code().to_string(),
            })?;
        Ok(PriceBreakdown {
            subtotal,
            discount,
            shipping,
            tax,
            total,
        })
    }
}

/// The money lines of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Sum of original prices.
    pub subtotal: Money,
    pub discount: Money,
    pub shipping: Money,
    pub tax: Money,
    /// `subtotal - discount + shipping + tax`.
    pub total: Money,
}

/// Body of a checkout quote request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuoteRequest {
    pub region: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn summary(cart_total: i64, original_total: i64) -> CartSummary {
        CartSummary {
            total_items: 1,
            total_unique_items: 1,
            cart_total: Money::tzs(cart_total),
            original_total: Money::tzs(original_total),
            total_discount: Money::tzs(original_total - cart_total),
            is_empty: false,
        }
    }

    #[test]
    fn test_home_region_ships_free() {
        let policy = PricingPolicy::default();
        assert!(policy.shipping_for("Dar es Salaam").is_zero());
        assert!(policy.shipping_for("  dar es salaam ").is_zero());
        assert_eq!(policy.shipping_for("Arusha"), Money::tzs(15_000));
    }

    #[test]
    fn test_quote_total_formula() {
        let policy = PricingPolicy::default();
        let quote = policy.quote(&summary(250_000, 250_000), "Arusha").unwrap();
        assert_eq!(quote.subtotal, Money::tzs(250_000));
        assert!(quote.discount.is_zero());
        assert_eq!(quote.shipping, Money::tzs(15_000));
        assert_eq!(quote.tax, Money::tzs(45_000));
        assert_eq!(quote.total, Money::tzs(310_000));
    }

    #[test]
    fn test_quote_with_discount() {
        let policy = PricingPolicy::default();
        let quote = policy.quote(&summary(80_000, 100_000), "Dar es Salaam").unwrap();
        assert_eq!(quote.discount, Money::tzs(20_000));
        assert_eq!(quote.tax, Money::tzs(14_400));
        assert_eq!(
            quote.total.amount,
            quote.subtotal.amount - quote.discount.amount + quote.shipping.amount + quote.tax.amount
        );
    }

    #[test]
    fn test_zero_tax_rate() {
        let policy = PricingPolicy {
            tax_bps: 0,
            ..PricingPolicy::default()
        };
        let quote = policy.quote(&CartSummary::empty(Currency::TZS), "Mwanza").unwrap();
        assert!(quote.tax.is_zero());
        assert_eq!(quote.total, Money::tzs(15_000));
    }
}
