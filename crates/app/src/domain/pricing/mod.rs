//! Pricing

pub mod errors;
mod repository;
pub mod service;
pub mod vendor;

pub use errors::PricingServiceError;
pub use repository::{MockVariantPrices, PgVariantPrices, VariantPrices};
pub use service::*;
pub use vendor::{MockVendorPricing, SinaliteClient, SinaliteConfig, VendorError, VendorPricing};
