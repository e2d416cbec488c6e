//! Checkout service errors.

use thiserror::Error;

use presswork::checkout::CheckoutError;

use crate::domain::tax::TaxServiceError;

#[derive(Debug, Error)]
pub enum CheckoutServiceError {
    #[error("unknown currency {0:?}")]
    UnknownCurrency(String),

    #[error("destination country and postal code are required")]
    InvalidAddress,

    #[error(transparent)]
    Plan(#[from] CheckoutError),

    #[error("tax calculation failed")]
    TaxService(#[from] TaxServiceError),
}
