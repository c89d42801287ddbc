use anyhow::Context;
use clap::Args;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use crate::config::{AppConfig, Flavor, StorageBackend};
use crate::database::DatabaseManager;
use crate::state::AppState;
use crate::{app, storage};

#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides APP_PORT/PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Storefront to serve: rent-easy or chat-point")]
    pub flavor: Option<Flavor>,

    #[arg(long, help = "Directory holding index.html and the storefront assets")]
    pub static_dir: Option<PathBuf>,
}

impl ServeArgs {
    fn apply(self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(flavor) = self.flavor {
            config.server.flavor = flavor;
        }
        if let Some(dir) = self.static_dir {
            config.server.static_dir = dir;
        }
    }
}

pub async fn handle(args: ServeArgs, mut config: AppConfig) -> anyhow::Result<()> {
    args.apply(&mut config);

    tracing::info!(
        "Starting {} storefront in {:?} mode",
        config.server.flavor.display_name(),
        config.environment
    );

    let pool = DatabaseManager::connect(&config.database).await?;
    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await?;
    }

    if config.storage.backend == StorageBackend::Local {
        tokio::fs::create_dir_all(&config.storage.local_dir)
            .await
            .with_context(|| format!("failed to create {}", config.storage.local_dir.display()))?;
    }
    let store = storage::from_config(&config.storage)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(
        static_dir = %config.server.static_dir.display(),
        cache = %config.cache_name(),
        "Listening on http://{}",
        addr
    );

    let state = AppState::new(config, pool.clone(), store);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close(&pool).await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
    tracing::info!("Shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    #[test]
    fn flags_override_config() {
        let mut config = AppConfig::for_environment(Environment::Development);
        ServeArgs {
            port: Some(9999),
            flavor: Some(Flavor::ChatPoint),
            static_dir: None,
        }
        .apply(&mut config);

        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.flavor, Flavor::ChatPoint);
        assert_eq!(config.server.static_dir, PathBuf::from("public"));
    }
}
