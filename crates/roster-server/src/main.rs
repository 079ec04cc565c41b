//! Roster Server - Main entry point

use anyhow::{Context, Result};
use roster_common::logging::{init_logging, LogConfig};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tracing::info;

use roster_server::{
    config::Config,
    db::{self, PgConnectionSource, ProcedureInvoker},
    features::{auth::LoginFlow, FeatureState},
    mail::SmtpMailer,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Defaults for this binary; LOG_* variables take precedence
    let log_config = LogConfig::builder()
        .log_file_prefix("roster-server")
        .filter_directives("roster_server=debug,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting Roster Server");

    let config = Config::load()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Configuration loaded"
    );

    let pool = db::create_pool(&config.database)
        .await
        .context("Failed to connect to the database")?;
    db::health_check(&pool)
        .await
        .context("Database did not answer the startup ping")?;

    let invoker = ProcedureInvoker::new(Arc::new(PgConnectionSource::new(pool)));

    let mailer = SmtpMailer::new(&config.smtp)?;
    if !mailer.is_configured() {
        tracing::warn!("SMTP credentials missing; login codes cannot be delivered");
    }
    let login = LoginFlow::new(invoker.clone(), Arc::new(mailer), config.otp.ttl());

    let app = roster_server::create_router(FeatureState { invoker, login }, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM, then gives in-flight requests a moment
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
