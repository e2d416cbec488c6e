//! Hosted tax calculation

use async_trait::async_trait;
use mockall::automock;

use presswork::tax::{TaxCalculation, TaxCalculationRequest};

mod stripe;

pub use stripe::{StripeConfig, StripeTaxClient, TaxServiceError};

/// A hosted service that determines jurisdiction and rates.
#[automock]
#[async_trait]
pub trait TaxCalculator: Send + Sync {
    /// Submit a validated request and extract subtotal, tax and total.
    async fn calculate(
        &self,
        request: &TaxCalculationRequest,
    ) -> Result<TaxCalculation, TaxServiceError>;
}
