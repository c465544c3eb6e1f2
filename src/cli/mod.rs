use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::{app, AppState};
use crate::config::{AppConfig, LoggingConfig};
use crate::database::{DatabaseManager, Repositories};
use crate::services::Services;

#[derive(Debug, Parser)]
#[command(name = "accounter-api")]
#[command(about = "Inventory backend for owners, stores and categories")]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "Apply embedded database migrations before serving")]
    pub migrate: bool,

    #[arg(long, help = "Use development defaults regardless of APP_ENV")]
    pub dev: bool,

    #[arg(long, value_name = "FILE", help = "Load environment variables from this file instead of .env")]
    pub env: Option<PathBuf>,

    #[arg(long, help = "Keep all data in memory (nothing survives a restart)")]
    pub in_memory: bool,
}

impl Cli {
    pub fn config(&self) -> AppConfig {
        if self.dev {
            AppConfig::development().with_env_overrides()
        } else {
            AppConfig::from_env()
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    load_env(cli.env.as_deref())?;

    let config = cli.config();
    config.validate().context("invalid configuration")?;
    init_tracing(&config.logging);

    info!(
        environment = ?config.environment,
        port = config.server.port,
        "starting {}", config.server.service_name
    );

    let repos = if cli.in_memory {
        warn!("using in-memory storage");
        Repositories::in_memory()
    } else {
        let manager = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        if cli.migrate {
            manager.migrate().await.context("failed to apply migrations")?;
            info!("migrations applied");
        }
        Repositories::postgres(manager)
    };

    let services = Services::new(repos, &config)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let state = AppState::new(services, config);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "listening");

    axum::serve(listener, app(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.services.close().await;
    info!("shutdown complete");
    Ok(())
}

fn load_env(path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path).with_context(|| format!("failed to load {}", path.display()))?;
        }
        // a missing .env is fine
        None => {
            dotenvy::dotenv().ok();
        }
    }
    Ok(())
}

/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
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
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from(["accounter-api", "--migrate", "--env", "local.env", "--in-memory"]).unwrap();
        assert!(cli.migrate);
        assert!(cli.in_memory);
        assert!(!cli.dev);
        assert_eq!(cli.env, Some(PathBuf::from("local.env")));
    }

    #[test]
    fn no_flags_is_valid() {
        let cli = Cli::try_parse_from(["accounter-api"]).unwrap();
        assert!(!cli.migrate && !cli.dev && !cli.in_memory);
        assert_eq!(cli.env, None);
    }
}
