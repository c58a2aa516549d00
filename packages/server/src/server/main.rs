// Main entry point for the grafana-snitch service

use std::sync::Arc;

use anyhow::{Context, Result};
use directory_client::DirectoryClient;
use snitch_core::{
    common::SyncConfig,
    kernel::{operation, start_scheduler, DirectoryAdapter, MetricsRegistry, ServerDeps},
    server::build_app,
    Config,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting grafana-snitch");

    let metrics = Arc::new(MetricsRegistry::new());

    let rules = SyncConfig::from_path(&config.config_path).with_context(|| {
        format!(
            "Failed to load sync rules from {}",
            config.config_path.display()
        )
    })?;
    tracing::info!(
        groups = rules.rules.groups.len(),
        users = rules.rules.users.len(),
        "Sync rules loaded"
    );

    let directory = match DirectoryClient::from_service_account_file(
        &config.google_admin_config,
        config.google_admin_email.clone(),
    ) {
        Ok(client) => client,
        Err(e) => {
            metrics.record_error(operation::GET_ADMIN_CONFIG);
            return Err(anyhow::Error::new(e).context(format!(
                "Failed to load Google admin credentials from {}",
                config.google_admin_config.display()
            )));
        }
    };
    metrics.record_success(operation::GET_ADMIN_CONFIG);
    tracing::info!(subject = %config.google_admin_email, "Directory client ready");

    let deps = Arc::new(
        ServerDeps::new(Arc::new(DirectoryAdapter::new(directory)), rules, metrics)
            .with_grafana(config.grafana_target()),
    );

    let scheduler = start_scheduler(deps.clone(), config.update_interval, config.sync_timeout)
        .await
        .context("Failed to start scheduler")?;

    let app = build_app(deps, config.request_timeout);

    tracing::info!("Starting server on {}", config.listen_address);
    tracing::info!("Health check: http://{}/health", config.listen_address);

    let listener = tokio::net::TcpListener::bind(config.listen_address)
        .await
        .context("Failed to bind to address")?;

    let shutdown = CancellationToken::new();
    let server = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown.cancelled_owned())
                .await
        }
    });

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, draining");
    shutdown.cancel();

    // One grace period covers both the HTTP drain and the in-flight pass.
    let grace = config.shutdown_grace;
    let deadline = tokio::time::Instant::now() + grace;
    match tokio::time::timeout_at(deadline, server).await {
        Ok(Ok(Ok(()))) => tracing::info!("HTTP server stopped"),
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "HTTP server error"),
        Ok(Err(e)) => tracing::error!(error = %e, "HTTP server task failed"),
        Err(_) => tracing::warn!(
            grace = %humantime::format_duration(grace),
            "In-flight requests did not finish in time"
        ),
    }

    scheduler
        .shutdown(remaining_grace(deadline))
        .await
        .context("Failed to stop scheduler")?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Time left before `deadline`, zero once it has passed.
fn remaining_grace(deadline: tokio::time::Instant) -> std::time::Duration {
    deadline.saturating_duration_since(tokio::time::Instant::now())
}

/// Resolves on SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
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
}
