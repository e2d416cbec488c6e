//! Database Config

use clap::Args;

/// Pricing database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string for the synced variant price table
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,
}
