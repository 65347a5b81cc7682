//! Database migrations.

use anyhow::{Context as _, Result};

use crate::context::Context;

pub async fn run(ctx: &Context) -> Result<()> {
    let db = ctx.connect().await?;
    ctx.output.info("Applying migrations");
    db.migrate().await.context("Migration failed")?;
    db.ping().await?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "migrated": true }));
    } else {
        ctx.output.success("Database is up to date");
    }
    Ok(())
}
