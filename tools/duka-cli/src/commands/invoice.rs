//! Invoice regeneration.

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::InvoiceArgs;
use crate::context::Context;

#[derive(Serialize)]
struct InvoiceReport<'a> {
    order_number: &'a str,
    url: &'a str,
    verification_code: &'a str,
    pages: usize,
    bytes: usize,
}

/// Render the order's invoice again and replace the stored copy.
pub async fn run(args: InvoiceArgs, ctx: &Context) -> Result<()> {
    let state = ctx.state().await?;
    ctx.output
        .info(&format!("Generating invoice for {}", args.order_number));

    let invoice = state
        .invoices
        .generate_by_number(args.order_number.trim())
        .await
        .with_context(|| format!("Could not generate the invoice for {}", args.order_number))?;

    let report = InvoiceReport {
        order_number: &invoice.order.order_number,
        url: &invoice.url,
        verification_code: &invoice.verification_code,
        pages: invoice.pages,
        bytes: invoice.size,
    };
    if ctx.output.is_json() {
        ctx.output.json(&report);
        return Ok(());
    }

    ctx.output.success("Invoice uploaded");
    ctx.output.kv("order", report.order_number);
    ctx.output.kv("total", &invoice.order.pricing.total.to_string());
    ctx.output.kv("url", report.url);
    ctx.output.kv("verification", report.verification_code);
    ctx.output
        .kv("pages", &format!("{} ({} bytes)", report.pages, report.bytes));
    Ok(())
}
