//! Checkout
//!
//! Composes discount resolution, allocation and taxable-line derivation for a
//! single checkout attempt.

use rusty_money::iso::Currency;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::{
    discounts::{Discount, DiscountAllocation, DiscountError, allocate_discount},
    lines::{CartLine, LineReference},
    tax::{TaxAddress, TaxCalculationRequest, TaxRequestError, TaxableLine, taxable_lines},
};

/// Errors raised while planning a checkout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// Two lines share a reference, so allocations would be ambiguous.
    #[error("duplicate line reference {0}")]
    DuplicateReference(LineReference),

    /// Shipping cannot be negative.
    #[error("shipping amount cannot be negative")]
    NegativeShipping,

    /// The line totals plus shipping do not fit in minor units.
    #[error("order amounts exceed the representable total")]
    AmountOverflow,

    /// The discount could not be resolved.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Discounted lines ready to be sent for tax calculation.
#[derive(Debug, Clone)]
pub struct CheckoutPlan {
    lines: Vec<CartLine>,
    subtotal: i64,
    allocation: DiscountAllocation,
    taxable: Vec<TaxableLine>,
    shipping: i64,
}

impl CheckoutPlan {
    /// Resolve and allocate `discount` over `lines`.
    ///
    /// Line order is preserved; the last positive line absorbs the allocation
    /// rounding remainder.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::DuplicateReference`]: two lines share a reference.
    /// - [`CheckoutError::NegativeShipping`]: `shipping` is below zero.
    /// - [`CheckoutError::AmountOverflow`]: the subtotal plus shipping overflows.
    /// - [`CheckoutError::Discount`]: a percentage discount overflowed.
    pub fn build(
        lines: Vec<CartLine>,
        discount: &Discount,
        shipping: i64,
    ) -> Result<Self, CheckoutError> {
        if shipping < 0 {
            return Err(CheckoutError::NegativeShipping);
        }

        let mut seen = FxHashSet::default();

        if let Some(duplicate) = lines.iter().find(|line| !seen.insert(line.reference())) {
            return Err(CheckoutError::DuplicateReference(duplicate.reference().clone()));
        }

        let subtotal = lines
            .iter()
            .map(|line| line.amount().max(0))
            .try_fold(0_i64, i64::checked_add)
            .filter(|subtotal| subtotal.checked_add(shipping).is_some())
            .ok_or(CheckoutError::AmountOverflow)?;

        let requested = discount.resolve(subtotal)?;
        let allocation = allocate_discount(&lines, requested);
        let taxable = taxable_lines(&lines, &allocation);

        Ok(Self {
            lines,
            subtotal,
            allocation,
            taxable,
            shipping,
        })
    }

    /// Cart lines in checkout order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Sum of positive line totals before discount.
    pub fn subtotal(&self) -> i64 {
        self.subtotal
    }

    /// Per-line discount allocation.
    pub fn allocation(&self) -> &DiscountAllocation {
        &self.allocation
    }

    /// Discount actually applied.
    pub fn applied_discount(&self) -> i64 {
        self.allocation.applied()
    }

    /// Lines with a positive net amount.
    pub fn taxable_lines(&self) -> &[TaxableLine] {
        &self.taxable
    }

    /// `subtotal - applied_discount`.
    ///
    /// Bounded by the subtotal, so adding shipping cannot overflow.
    pub fn net_subtotal(&self) -> i64 {
        self.taxable.iter().map(|line| line.amount).sum()
    }

    /// Shipping cost.
    pub fn shipping(&self) -> i64 {
        self.shipping
    }

    /// Build the hosted tax request for this plan.
    ///
    /// # Errors
    ///
    /// See [`TaxCalculationRequest::new`].
    pub fn tax_request(
        &self,
        currency: &'static Currency,
        address: TaxAddress,
    ) -> Result<TaxCalculationRequest, TaxRequestError> {
        TaxCalculationRequest::new(currency, address, self.taxable.iter().cloned(), self.shipping)
    }
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;

    fn cart() -> Vec<CartLine> {
        vec![
            CartLine::new("A", 1_000, 1),
            CartLine::new("B", 2_000, 1),
            CartLine::new("C", 3_000, 1),
        ]
    }

    fn address() -> TaxAddress {
        TaxAddress {
            country: "US".to_string(),
            postal_code: "10001".to_string(),
            ..TaxAddress::default()
        }
    }

    #[test]
    fn store_credit_plan_nets_lines() -> TestResult {
        let plan = CheckoutPlan::build(cart(), &Discount::StoreCredit(300), 995)?;

        assert_eq!(plan.subtotal(), 6_000);
        assert_eq!(plan.applied_discount(), 300);
        assert_eq!(plan.net_subtotal(), 5_700);
        assert_eq!(
            plan.taxable_lines()
                .iter()
                .map(|line| line.amount)
                .collect::<Vec<_>>(),
            vec![950, 1_900, 2_850]
        );

        Ok(())
    }

    #[test]
    fn percentage_plan_resolves_against_subtotal() -> TestResult {
        let plan = CheckoutPlan::build(cart(), &Discount::PercentageOff(Percentage::from(0.1)), 0)?;

        assert_eq!(plan.applied_discount(), 600);
        assert_eq!(plan.net_subtotal(), 5_400);

        Ok(())
    }

    #[test]
    fn duplicate_references_are_rejected() {
        let lines = vec![CartLine::new("A", 100, 1), CartLine::new("A", 200, 1)];

        let result = CheckoutPlan::build(lines, &Discount::None, 0);

        assert!(matches!(
            result,
            Err(CheckoutError::DuplicateReference(reference)) if reference.as_str() == "A"
        ));
    }

    #[test]
    fn negative_shipping_is_rejected() {
        let result = CheckoutPlan::build(cart(), &Discount::None, -1);

        assert!(matches!(result, Err(CheckoutError::NegativeShipping)));
    }

    #[test]
    fn overflowing_subtotal_is_rejected() {
        let half = i64::MAX / 2 + 1;
        let lines = vec![CartLine::new("A", half, 1), CartLine::new("B", half, 1)];

        let result = CheckoutPlan::build(lines, &Discount::None, 0);

        assert!(matches!(result, Err(CheckoutError::AmountOverflow)));
    }

    #[test]
    fn overflowing_shipping_is_rejected() {
        let lines = vec![CartLine::new("A", i64::MAX - 10, 1)];

        let result = CheckoutPlan::build(lines, &Discount::StoreCredit(5), 11);

        assert!(matches!(result, Err(CheckoutError::AmountOverflow)));
    }

    #[test]
    fn largest_representable_order_is_accepted() -> TestResult {
        let lines = vec![CartLine::new("A", i64::MAX - 10, 1)];

        let plan = CheckoutPlan::build(lines, &Discount::StoreCredit(5), 10)?;

        assert_eq!(plan.net_subtotal(), i64::MAX - 15);
        assert_eq!(plan.net_subtotal() + plan.shipping(), i64::MAX - 5);

        Ok(())
    }

    #[test]
    fn fully_discounted_plan_has_nothing_taxable() -> TestResult {
        let plan = CheckoutPlan::build(cart(), &Discount::StoreCredit(10_000), 0)?;

        assert!(plan.taxable_lines().is_empty());
        assert!(matches!(
            plan.tax_request(USD, address()),
            Err(TaxRequestError::NoTaxableLines)
        ));

        Ok(())
    }

    #[test]
    fn tax_request_carries_shipping() -> TestResult {
        let plan = CheckoutPlan::build(cart(), &Discount::None, 750)?;
        let request = plan.tax_request(USD, address())?;

        assert_eq!(request.shipping(), Some(750));
        assert_eq!(request.lines_total(), 6_000);

        Ok(())
    }
}
