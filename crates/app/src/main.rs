//! Presswork Application CLI

use std::process;

use clap::{Args, Parser, Subcommand};
use presswork::pricing::{OptionId, PriceResolution, ProductId, StoreCode, VariantKey};
use presswork_app::{
    database,
    domain::pricing::{PgVariantPrices, VariantPrices},
};

#[derive(Debug, Parser)]
#[command(name = "presswork-app", about = "Presswork CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the canonical variant key for a set of option ids
    VariantKey(VariantKeyArgs),

    /// Look up the synced price for a product configuration
    Price(PriceArgs),
}

#[derive(Debug, Args)]
struct VariantKeyArgs {
    /// Selected option ids, in any order
    #[arg(required = true, num_args = 1..)]
    options: Vec<OptionId>,
}

#[derive(Debug, Args)]
struct PriceArgs {
    /// Vendor product id
    #[arg(long)]
    product: ProductId,

    /// Vendor store code (en_us, en_ca)
    #[arg(long, default_value = "en_us")]
    store: StoreCode,

    /// Selected option ids, in any order
    #[arg(required = true, num_args = 1..)]
    options: Vec<OptionId>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::VariantKey(args) => {
            println!("{}", VariantKey::from_option_ids(args.options));

            Ok(())
        }
        Commands::Price(args) => price(args).await,
    }
}

async fn price(args: PriceArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let key = VariantKey::from_option_ids(args.options);

    let row = PgVariantPrices::new(pool)
        .find_price(args.product, args.store, &key)
        .await
        .map_err(|error| format!("failed to look up price: {error}"))?;

    println!("variant_key: {key}");

    match PriceResolution::from_lookup(row) {
        PriceResolution::Local {
            unit_price,
            synced_at,
        } => {
            println!("unit_price: {unit_price}");
            println!("synced_at: {synced_at}");
        }
        PriceResolution::Miss { reason } => {
            println!("miss: {}", reason.as_str());
        }
    }

    Ok(())
}
