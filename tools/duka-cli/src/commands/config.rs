//! Configuration commands.

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand, ConfigFormat};
use crate::context::Context;

pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show { format } => show_config(format, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(format: ConfigFormat, ctx: &Context) -> Result<()> {
    let redacted = ctx.config.redacted();
    // The global --json flag wins over --format.
    if ctx.output.is_json() || format == ConfigFormat::Json {
        ctx.output.json(&redacted);
        return Ok(());
    }
    print!("{}", redacted.to_toml()?);
    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    if let Err(fields) = ctx.config.commerce.site_settings().validate() {
        for (field, message) in fields.iter() {
            errors.push(format!("commerce.{field}: {message}"));
        }
    }
    if ctx.config.commerce.cart_ttl_days <= 0 {
        errors.push("commerce.cart_ttl_days must be positive".to_string());
    }
    if ctx.config.session.ttl_hours <= 0 {
        errors.push("session.ttl_hours must be positive".to_string());
    }
    if ctx.config.storage.endpoint.is_empty() {
        errors.push("storage.endpoint is required for invoices".to_string());
    }
    if ctx.config.mail.endpoint.is_none() {
        warnings.push("mail.endpoint is not set; emails will only be logged".to_string());
    }
    if ctx.config.server.cors_origins.is_empty() {
        warnings.push("server.cors_origins is empty; any origin is allowed".to_string());
    }

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "valid": errors.is_empty(),
            "errors": errors,
            "warnings": warnings,
        }));
    } else {
        for error in &errors {
            ctx.output.error(&format!("Error: {}", error));
        }
        for warning in &warnings {
            ctx.output.warn(&format!("Warning: {}", warning));
        }
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    if warnings.is_empty() {
        ctx.output.success("Configuration is valid");
    } else {
        ctx.output.success("Configuration is valid (with warnings)");
    }
    Ok(())
}
