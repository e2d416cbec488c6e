//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database,
    domain::{
        checkout::{CheckoutService, HostedTaxCheckoutService},
        pricing::{
            LocalPricingService, PgVariantPrices, PricingService, SinaliteClient, SinaliteConfig,
        },
        tax::{StripeConfig, StripeTaxClient},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// Settings needed to wire up the application services.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub stripe: StripeConfig,
    pub sinalite: SinaliteConfig,
}

#[derive(Clone)]
pub struct AppContext {
    pub pricing: Arc<dyn PricingService>,
    pub checkout: Arc<dyn CheckoutService>,
}

impl AppContext {
    /// Build application context, connecting to the pricing database.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_config(config: AppConfig) -> Result<Self, AppInitError> {
        let pool = database::connect(&config.database_url)
            .await
            .map_err(AppInitError::Database)?;

        let prices = Arc::new(PgVariantPrices::new(pool));
        let vendor = Arc::new(SinaliteClient::new(config.sinalite));
        let tax = Arc::new(StripeTaxClient::new(config.stripe));

        Ok(Self {
            pricing: Arc::new(LocalPricingService::new(prices, vendor)),
            checkout: Arc::new(HostedTaxCheckoutService::new(tax)),
        })
    }
}
