//! Discounts
//!
//! A checkout discount is either loyalty store credit, a fixed amount, or a
//! promo-code percentage of the qualifying subtotal. Both resolve to minor
//! units before being spread across cart lines by [`allocate_discount`].

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use thiserror::Error;

pub mod allocation;

pub use allocation::{DiscountAllocation, allocate_discount};

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,
}

/// Discount requested for a checkout.
#[derive(Debug, Copy, Clone, Default)]
pub enum Discount {
    /// No discount.
    #[default]
    None,

    /// Loyalty store credit, in minor units.
    StoreCredit(i64),

    /// Promo code taking a percentage off the qualifying subtotal.
    PercentageOff(Percentage),
}

impl Discount {
    /// Resolve the requested discount against the qualifying subtotal.
    ///
    /// The result is never negative. It may exceed `subtotal`; clamping to the
    /// subtotal happens during allocation.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::PercentConversion`] if a percentage discount
    /// cannot be represented in minor units.
    pub fn resolve(&self, subtotal: i64) -> Result<i64, DiscountError> {
        let requested = match self {
            Discount::None => 0,
            Discount::StoreCredit(amount) => *amount,
            Discount::PercentageOff(percent) => percent_of_minor(percent, subtotal.max(0))?,
        };

        Ok(requested.max(0))
    }
}

/// Calculate a percentage of a minor-unit amount, rounding half away from zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage has no accessor for the inner Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}
