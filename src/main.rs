use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use person_service::{
    build_router,
    config::{AppConfig, Cli, DatabaseBackend},
    repository::{InMemoryPersonRepository, PersonRepository, PgPersonRepository},
    service::PersonService,
    state::AppState,
};
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::from_env()
        .context("failed to load application configuration")?
        .with_overrides(cli);

    let repository: Arc<dyn PersonRepository> = match config.database_backend {
        DatabaseBackend::Postgres => {
            info!(
                max_connections = config.db_max_connections,
                "database backend: postgres"
            );
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(config.db_acquire_timeout)
                .connect(&config.database_url)
                .await
                .context("failed to connect to PostgreSQL")?;
            Arc::new(
                PgPersonRepository::new(pool).with_statement_timeout(config.db_statement_timeout),
            )
        }
        DatabaseBackend::Memory => {
            warn!("database backend: memory; data is lost on shutdown");
            Arc::new(InMemoryPersonRepository::new())
        }
    };

    let service = Arc::new(PersonService::new(repository));
    let app = build_router(AppState::new(service));

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, "person service started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("person service stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("person_service=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
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
