//! CLI command implementations.

pub mod admin;
pub mod config;
pub mod invoice;
pub mod migrate;
pub mod seed;

use clap::{Args, Subcommand, ValueEnum};

/// Arguments for the seed command.
#[derive(Args)]
pub struct SeedArgs {
    /// Only seed the catalog; leave contact details, FAQ and settings alone.
    #[arg(long)]
    pub catalog_only: bool,
}

/// Arguments for the create-admin command.
#[derive(Args)]
pub struct CreateAdminArgs {
    /// Login email.
    #[arg(short, long)]
    pub email: String,

    /// Display name.
    #[arg(short, long, default_value = "Store Admin")]
    pub name: String,

    /// Password (at least 8 characters, with a letter and a digit).
    #[arg(short, long, env = "DUKA_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Arguments for the invoice command.
#[derive(Args)]
pub struct InvoiceArgs {
    /// Order number, e.g. ORD-20250101-AB12CD.
    pub order_number: String,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration with secrets redacted.
    Show {
        #[arg(short, long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
    /// Check the commerce settings the server would start with.
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
}
