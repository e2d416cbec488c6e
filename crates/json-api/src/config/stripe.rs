//! Stripe Tax Config

use clap::Args;

use presswork_app::domain::tax::StripeConfig;

/// Stripe Tax API settings.
#[derive(Debug, Args)]
pub struct StripeTaxConfig {
    /// Stripe secret API key
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    pub stripe_secret_key: String,

    /// Stripe API base URL
    #[arg(long, env = "STRIPE_API_BASE", default_value = "https://api.stripe.com")]
    pub stripe_api_base: String,
}

impl StripeTaxConfig {
    pub(crate) fn to_stripe_config(&self) -> StripeConfig {
        StripeConfig {
            api_base: self.stripe_api_base.clone(),
            secret_key: self.stripe_secret_key.clone(),
        }
    }
}
