//! Tax
//!
//! Shapes requests for the hosted tax-calculation service out of net
//! (post-discount) line amounts. Rate determination is the hosted service's
//! job; this module only decides what gets sent and validates it first.

use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    discounts::DiscountAllocation,
    lines::{CartLine, LineReference},
};

pub mod reconcile;

pub use reconcile::{ReconciledTax, reconcile_tax};

/// Reasons a tax calculation request cannot be built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxRequestError {
    /// Destination country or postal code is missing.
    #[error("destination country and postal code are required")]
    InvalidAddress,

    /// Every line was discounted to zero.
    #[error("no line has a positive taxable amount")]
    NoTaxableLines,
}

/// Whether an amount already includes tax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBehavior {
    /// Tax is added on top of the amount.
    #[default]
    Exclusive,

    /// The amount already contains tax.
    Inclusive,
}

impl TaxBehavior {
    /// Wire value used by the hosted tax service.
    pub fn as_str(self) -> &'static str {
        match self {
            TaxBehavior::Exclusive => "exclusive",
            TaxBehavior::Inclusive => "inclusive",
        }
    }
}

/// Destination address for a tax calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxAddress {
    /// Two-letter country code.
    pub country: String,

    /// Postal or ZIP code.
    pub postal_code: String,

    /// State, province or region.
    #[serde(default)]
    pub state: Option<String>,

    /// City.
    #[serde(default)]
    pub city: Option<String>,

    /// First street line.
    #[serde(default)]
    pub line1: Option<String>,
}

impl TaxAddress {
    /// Whether the address carries enough to locate a tax jurisdiction.
    pub fn is_locatable(&self) -> bool {
        !self.country.trim().is_empty() && !self.postal_code.trim().is_empty()
    }
}

/// A line sent for tax calculation, net of its discount allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxableLine {
    /// Line reference.
    pub reference: LineReference,

    /// Net amount in minor units.
    pub amount: i64,

    /// Quantity, defaults to 1.
    pub quantity: u32,

    /// Product tax classification code.
    pub tax_code: Option<String>,

    /// Tax behaviour for `amount`.
    pub tax_behavior: TaxBehavior,
}

impl TaxableLine {
    /// A tax-exclusive line with a quantity of 1 and no tax code.
    pub fn new(reference: impl Into<LineReference>, amount: i64) -> Self {
        Self {
            reference: reference.into(),
            amount,
            quantity: 1,
            tax_code: None,
            tax_behavior: TaxBehavior::default(),
        }
    }
}

/// Derive taxable lines from cart lines and their discount allocation.
///
/// Lines whose net amount is zero or less are dropped, so the result sums to
/// exactly `subtotal - applied`.
pub fn taxable_lines(lines: &[CartLine], allocation: &DiscountAllocation) -> Vec<TaxableLine> {
    lines
        .iter()
        .filter(|line| line.amount() > 0)
        .filter_map(|line| {
            let amount = allocation.net_amount(line);

            (amount > 0).then(|| TaxableLine {
                reference: line.reference().clone(),
                amount,
                quantity: line.quantity().max(1),
                tax_code: line.tax_code().map(str::to_owned),
                tax_behavior: TaxBehavior::Exclusive,
            })
        })
        .collect()
}

/// A validated request for the hosted tax-calculation service.
#[derive(Debug, Clone)]
pub struct TaxCalculationRequest {
    currency: &'static Currency,
    address: TaxAddress,
    lines: SmallVec<[TaxableLine; 10]>,
    shipping: Option<i64>,
}

impl TaxCalculationRequest {
    /// Build a request, dropping non-positive lines and zero shipping.
    ///
    /// # Errors
    ///
    /// - [`TaxRequestError::InvalidAddress`]: country or postal code is blank.
    /// - [`TaxRequestError::NoTaxableLines`]: no line has a positive amount.
    pub fn new(
        currency: &'static Currency,
        address: TaxAddress,
        lines: impl IntoIterator<Item = TaxableLine>,
        shipping: i64,
    ) -> Result<Self, TaxRequestError> {
        if !address.is_locatable() {
            return Err(TaxRequestError::InvalidAddress);
        }

        let lines: SmallVec<[TaxableLine; 10]> =
            lines.into_iter().filter(|line| line.amount > 0).collect();

        if lines.is_empty() {
            return Err(TaxRequestError::NoTaxableLines);
        }

        Ok(Self {
            currency,
            address,
            lines,
            shipping: (shipping > 0).then_some(shipping),
        })
    }

    /// Currency of every amount in the request.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Destination address.
    pub fn address(&self) -> &TaxAddress {
        &self.address
    }

    /// Taxable lines, all with positive amounts.
    pub fn lines(&self) -> &[TaxableLine] {
        &self.lines
    }

    /// Shipping cost, present only when positive.
    pub fn shipping(&self) -> Option<i64> {
        self.shipping
    }

    /// Sum of the line amounts.
    pub fn lines_total(&self) -> i64 {
        self.lines.iter().map(|line| line.amount).sum()
    }
}

/// Figures extracted from a hosted tax calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCalculation {
    /// Opaque calculation identifier from the hosted service.
    pub id: String,

    /// Total before exclusive tax.
    pub amount_subtotal: i64,

    /// Tax amount.
    pub tax_amount: i64,

    /// Total including tax.
    pub amount_total: i64,
}
