//! Duka CLI - operator tool for the Duka storefront.
//!
//! Commands:
//! - `duka migrate` - Apply database migrations
//! - `duka seed` - Load the demo catalog and store content
//! - `duka create-admin` - Create a back-office account
//! - `duka invoice` - Regenerate an order's invoice
//! - `duka config` - Inspect configuration

mod commands;
mod context;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{ConfigArgs, CreateAdminArgs, InvoiceArgs, SeedArgs};

/// Duka CLI - manage a Duka storefront deployment
#[derive(Parser)]
#[command(name = "duka")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path (defaults to ./duka.toml when present)
    #[arg(short, long, global = true, env = "DUKA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Load the demo catalog, contact details, FAQ and settings
    Seed(SeedArgs),

    /// Create an administrator account
    CreateAdmin(CreateAdminArgs),

    /// Regenerate and upload the invoice for an order
    Invoice(InvoiceArgs),

    /// Inspect configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);
    let ctx = match context::Context::load(cli.config.as_deref(), output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Migrate => commands::migrate::run(&ctx).await,
        Commands::Seed(args) => commands::seed::run(args, &ctx).await,
        Commands::CreateAdmin(args) => commands::admin::run(args, &ctx).await,
        Commands::Invoice(args) => commands::invoice::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
