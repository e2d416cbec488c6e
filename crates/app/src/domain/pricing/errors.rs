//! Pricing service errors.

use thiserror::Error;

use super::vendor::VendorError;

#[derive(Debug, Error)]
pub enum PricingServiceError {
    #[error("a configuration needs at least one option")]
    NoOptions,

    #[error("storage error")]
    Sql(#[from] sqlx::Error),

    #[error("vendor pricing failed")]
    Vendor(#[from] VendorError),
}
