//! Checkout Models

use rusty_money::{Money, iso::Currency};

use presswork::{
    checkout::CheckoutPlan,
    discounts::Discount,
    lines::{CartLine, LineReference},
    tax::{TaxAddress, TaxCalculation, TaxableLine},
};

/// Checkout Request Model
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// ISO 4217 currency code, any case.
    pub currency: String,
    pub address: TaxAddress,
    /// Lines in stable cart order.
    pub lines: Vec<CartLine>,
    pub discount: Discount,
    pub shipping: i64,
}

/// Checkout Quote Model
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutQuote {
    pub currency: &'static Currency,
    /// `None` for free orders that never reached the tax service.
    pub calculation_id: Option<String>,
    pub subtotal: i64,
    pub applied_discount: i64,
    pub allocations: Vec<(LineReference, i64)>,
    pub taxable_lines: Vec<TaxableLine>,
    pub net_subtotal: i64,
    pub shipping: i64,
    pub tax: i64,
    pub total: i64,
}

impl CheckoutQuote {
    pub(crate) fn taxed(
        currency: &'static Currency,
        plan: &CheckoutPlan,
        calculation: TaxCalculation,
    ) -> Self {
        Self {
            calculation_id: Some(calculation.id),
            tax: calculation.tax_amount,
            total: calculation.amount_total,
            ..Self::untaxed(currency, plan)
        }
    }

    pub(crate) fn untaxed(currency: &'static Currency, plan: &CheckoutPlan) -> Self {
        Self {
            currency,
            calculation_id: None,
            subtotal: plan.subtotal(),
            applied_discount: plan.applied_discount(),
            allocations: plan
                .allocation()
                .iter()
                .map(|(reference, amount)| (reference.clone(), amount))
                .collect(),
            taxable_lines: plan.taxable_lines().to_vec(),
            net_subtotal: plan.net_subtotal(),
            shipping: plan.shipping(),
            tax: 0,
            total: plan.net_subtotal() + plan.shipping(),
        }
    }

    /// Whether no tax calculation was needed.
    pub fn is_free_order(&self) -> bool {
        self.calculation_id.is_none()
    }

    /// Format a minor-unit amount in the quote currency.
    pub fn display(&self, amount: i64) -> String {
        Money::from_minor(amount, self.currency).to_string()
    }
}

/// Settled charge details, as seen by webhook processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// Total the processor settled, when known.
    pub settled_total: Option<i64>,
    pub net_subtotal: i64,
    pub shipping: i64,
}
