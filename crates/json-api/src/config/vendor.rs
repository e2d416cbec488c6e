//! Vendor Pricing Config

use clap::Args;

use presswork_app::domain::pricing::SinaliteConfig;

/// SinaLite API settings for live price fallback.
#[derive(Debug, Args)]
pub struct VendorConfig {
    /// SinaLite API base URL
    #[arg(
        long,
        env = "SINALITE_API_BASE",
        default_value = "https://api.sinaliteuppy.com"
    )]
    pub sinalite_api_base: String,

    /// SinaLite OAuth client id
    #[arg(long, env = "SINALITE_CLIENT_ID")]
    pub sinalite_client_id: String,

    /// SinaLite OAuth client secret
    #[arg(long, env = "SINALITE_CLIENT_SECRET", hide_env_values = true)]
    pub sinalite_client_secret: String,

    /// SinaLite OAuth audience
    #[arg(
        long,
        env = "SINALITE_AUDIENCE",
        default_value = "https://apiconnect.sinalite.com"
    )]
    pub sinalite_audience: String,
}

impl VendorConfig {
    pub(crate) fn to_sinalite_config(&self) -> SinaliteConfig {
        SinaliteConfig {
            api_base: self.sinalite_api_base.clone(),
            client_id: self.sinalite_client_id.clone(),
            client_secret: self.sinalite_client_secret.clone(),
            audience: self.sinalite_audience.clone(),
        }
    }
}
