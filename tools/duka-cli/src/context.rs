//! CLI execution context.

use std::path::Path;

use anyhow::{Context as _, Result};
use duka_db::Db;
use duka_server::config::LoggingConfig;
use duka_server::{telemetry, AppState, DukaConfig, LogFormat};

use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    pub config: DukaConfig,
    pub output: Output,
}

impl Context {
    /// Load configuration the same way the server does. Verbose runs also
    /// print the services' own log lines.
    pub fn load(config_path: Option<&Path>, output: Output) -> Result<Self> {
        let config = DukaConfig::load(config_path).context("Failed to load configuration")?;

        if output.is_verbose() {
            let logging = LoggingConfig {
                level: "debug,sqlx=warn".to_string(),
                format: LogFormat::Human,
            };
            telemetry::init(&logging)?;
        }

        Ok(Self { config, output })
    }

    /// Open the configured database.
    pub async fn connect(&self) -> Result<Db> {
        self.output.debug("Connecting to database");
        Db::connect(&self.config.database.url, self.config.database.pool)
            .await
            .context("Failed to connect to the database")
    }

    /// The same services the server runs with.
    pub async fn state(&self) -> Result<AppState> {
        let db = self.connect().await?;
        AppState::from_db(db, &self.config)
    }
}
