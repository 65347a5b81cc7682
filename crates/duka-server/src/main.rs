use clap::Parser;
use duka_auth::SessionManager;
use duka_db::Db;
use duka_server::{build_app, telemetry, AppState, DukaConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

#[derive(Debug, Parser)]
#[command(name = "duka-server", version, about = "Duka storefront API")]
struct Args {
    /// Config file (defaults to ./duka.toml when present).
    #[arg(short, long, env = "DUKA_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let config = DukaConfig::load(args.config.as_deref())?;
    telemetry::init(&config.logging)?;

    let db = Db::connect(&config.database.url, config.database.pool).await?;
    db.migrate().await?;

    let state = AppState::from_db(db, &config)?;
    let sweeper = tokio::spawn(sweep_sessions(state.auth.sessions().clone()));
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr).await?;
    info!(addr = %config.server.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    sweeper.abort();
    Ok(())
}

/// Reclaim lapsed sessions that no request looks up again.
async fn sweep_sessions(sessions: SessionManager) {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        let removed = sessions.purge_expired();
        debug!(removed, "session sweep");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("received shutdown signal, starting graceful shutdown");
}
