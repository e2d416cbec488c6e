//! Cart Lines

use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while turning a priced line into a cart line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineError {
    /// A line total or unit amount was below zero.
    #[error("line {0} has a negative amount")]
    NegativeAmount(LineReference),

    /// A unit-priced line had a quantity of zero.
    #[error("line {0} has a zero quantity")]
    ZeroQuantity(LineReference),

    /// `unit_amount * quantity` does not fit in minor units.
    #[error("line {0} total overflowed")]
    QuantityOverflow(LineReference),
}

/// Stable identifier for a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineReference(String);

impl LineReference {
    /// Create a new line reference.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Borrow the reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for LineReference {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LineReference {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LineReference {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// How a line was priced when it entered the checkout.
///
/// Exactly one pricing shape is accepted per line, so consumers never have to
/// guess at whichever total-like field happens to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LinePrice {
    /// The total for the whole line, in minor units.
    LineTotal {
        /// Line total in minor units.
        amount: i64,
    },

    /// A per-unit price to be multiplied out by quantity.
    UnitPrice {
        /// Unit price in minor units.
        unit_amount: i64,

        /// Number of units.
        quantity: u32,
    },
}

/// A single cart line with its raw (pre-discount) total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    reference: LineReference,
    amount: i64,
    quantity: u32,
    tax_code: Option<String>,
}

impl CartLine {
    /// Create a line from an already-totalled amount.
    pub fn new(reference: impl Into<LineReference>, amount: i64, quantity: u32) -> Self {
        Self {
            reference: reference.into(),
            amount,
            quantity,
            tax_code: None,
        }
    }

    /// Build a line from a validated [`LinePrice`].
    ///
    /// # Errors
    ///
    /// - [`LineError::NegativeAmount`]: the total or unit amount is negative.
    /// - [`LineError::ZeroQuantity`]: a unit-priced line has no units.
    /// - [`LineError::QuantityOverflow`]: the multiplied-out total overflows.
    pub fn priced(reference: impl Into<LineReference>, price: LinePrice) -> Result<Self, LineError> {
        let reference = reference.into();

        match price {
            LinePrice::LineTotal { amount } if amount < 0 => {
                Err(LineError::NegativeAmount(reference))
            }
            LinePrice::LineTotal { amount } => Ok(Self::new(reference, amount, 1)),
            LinePrice::UnitPrice { unit_amount, .. } if unit_amount < 0 => {
                Err(LineError::NegativeAmount(reference))
            }
            LinePrice::UnitPrice { quantity: 0, .. } => Err(LineError::ZeroQuantity(reference)),
            LinePrice::UnitPrice {
                unit_amount,
                quantity,
            } => match unit_amount.checked_mul(i64::from(quantity)) {
                Some(amount) => Ok(Self::new(reference, amount, quantity)),
                None => Err(LineError::QuantityOverflow(reference)),
            },
        }
    }

    /// Attach a product tax classification code.
    #[must_use]
    pub fn with_tax_code(mut self, tax_code: impl Into<String>) -> Self {
        self.tax_code = Some(tax_code.into());
        self
    }

    /// Line reference.
    pub fn reference(&self) -> &LineReference {
        &self.reference
    }

    /// Raw line total in minor units.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Quantity on the line.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Product tax classification code, if any.
    pub fn tax_code(&self) -> Option<&str> {
        self.tax_code.as_deref()
    }
}
