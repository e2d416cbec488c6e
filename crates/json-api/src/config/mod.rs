//! Server configuration module

use clap::Parser;

use presswork_app::context::AppConfig;

use crate::config::{
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    server::ServerRuntimeConfig,
    stripe::StripeTaxConfig,
    vendor::VendorConfig,
};

pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod server;
pub(crate) mod stripe;
pub(crate) mod vendor;

/// Presswork JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "presswork-json", about = "Presswork JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Request observability settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Pricing database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Stripe Tax settings.
    #[command(flatten)]
    pub stripe: StripeTaxConfig,

    /// SinaLite live pricing settings.
    #[command(flatten)]
    pub vendor: VendorConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }

    /// Settings for wiring the application services.
    #[must_use]
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            database_url: self.database.database_url.clone(),
            stripe: self.stripe.to_stripe_config(),
            sinalite: self.vendor.to_sinalite_config(),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    const REQUIRED: [&str; 9] = [
        "presswork-json",
        "--database-url",
        "postgres://localhost/presswork",
        "--stripe-secret-key",
        "sk_test_123",
        "--sinalite-client-id",
        "client",
        "--sinalite-client-secret",
        "secret",
    ];

    #[test]
    fn defaults_fill_optional_settings() -> TestResult {
        let config = ServerConfig::try_parse_from(REQUIRED)?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8698");
        assert_eq!(config.observability.slow_request_threshold_ms, 1_000);

        let app = config.app_config();

        assert_eq!(app.database_url, "postgres://localhost/presswork");
        assert_eq!(app.stripe.api_base, "https://api.stripe.com");
        assert_eq!(app.stripe.secret_key, "sk_test_123");
        assert_eq!(app.sinalite.api_base, "https://api.sinaliteuppy.com");
        assert_eq!(app.sinalite.audience, "https://apiconnect.sinalite.com");

        Ok(())
    }

    #[test]
    fn missing_stripe_key_is_rejected() {
        let result = ServerConfig::try_parse_from([
            "presswork-json",
            "--database-url",
            "postgres://localhost/presswork",
            "--sinalite-client-id",
            "client",
            "--sinalite-client-secret",
            "secret",
        ]);

        assert!(result.is_err(), "expected missing Stripe key to fail");
    }
}
