//! Derived cart totals.

use crate::cart::CartItem;
use crate::error::CommerceError;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Totals derived from the current cart lines. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    /// Sum of quantities.
    pub total_items: i64,
    /// Number of distinct lines.
    pub total_unique_items: i64,
    /// Sum of unit price times quantity.
    pub cart_total: Money,
    /// Sum of the products' original price times quantity.
    pub original_total: Money,
    /// `original_total - cart_total`.
    pub total_discount: Money,
    pub is_empty: bool,
}

impl CartSummary {
    pub fn empty(currency: Currency) -> Self {
        Self {
            total_items: 0,
            total_unique_items: 0,
            cart_total: Money::zero(currency),
            original_total: Money::zero(currency),
            total_discount: Money::zero(currency),
            is_empty: true,
        }
    }

    /// Recompute totals from scratch.
    pub fn from_items(items: &[CartItem], currency: Currency) -> Result<Self, CommerceError> {
        let mut summary = Self::empty(currency);
        for item in items {
            summary.total_items = summary
                .total_items
                .checked_add(item.quantity)
                .ok_or(CommerceError::Overflow)?;
            summary.cart_total = add(summary.cart_total, item.line_total()?)?;
            summary.original_total = add(summary.original_total, item.original_line_total()?)?;
        }
        summary.total_unique_items = items.len() as i64;
        summary.total_discount = summary
            .original_total
            .try_subtract(&summary.cart_total)
            .ok_or(CommerceError::Overflow)?;
        summary.is_empty = items.is_empty();
        Ok(summary)
    }
}

fn add(acc: Money, value: Money) -> Result<Money, CommerceError> {
    acc.try_add(&value).ok_or_else(|| {
        if acc.currency != value.currency {
            CommerceError::CurrencyMismatch {
                expected: acc.currency.code().to_string(),
                got: value.currency.code().to_string(),
            }
        } else {
            CommerceError::Overflow
        }
    })
}
