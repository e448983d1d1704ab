//! Filament Shop CLI - Database migrations and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! fs-cli migrate
//!
//! # Load products from a YAML file (skips names that already exist)
//! fs-cli seed crates/cli/seed/catalog.yaml
//!
//! # Set stock directly, or adjust it relative to the current count
//! fs-cli stock set <product-id> 25
//! fs-cli stock adjust <product-id> -- -3
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "fs-cli")]
#[command(author, version, about = "Filament Shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Create catalog products from a YAML file
    Seed {
        /// Path to the YAML product list
        file: String,
    },
    /// Change a product's stock count
    Stock {
        #[command(subcommand)]
        action: StockAction,
    },
}

#[derive(Subcommand)]
enum StockAction {
    /// Overwrite the stock count
    Set {
        /// Product ID
        product_id: String,
        /// New stock count
        count: u32,
    },
    /// Add to (or, with a negative delta, take from) the current count
    Adjust {
        /// Product ID
        product_id: String,
        /// Signed change in units
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { file } => commands::seed::products(&file).await?,
        Commands::Stock { action } => match action {
            StockAction::Set { product_id, count } => {
                commands::stock::set(&product_id, count).await?;
            }
            StockAction::Adjust { product_id, delta } => {
                commands::stock::adjust(&product_id, delta).await?;
            }
        },
    }
    Ok(())
}
