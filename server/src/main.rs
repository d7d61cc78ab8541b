//! The Knife HTTP server.
//!
//! Restaurant guide backend serving the catalog, reservation,
//! invoicing, review, and analytics API, with Prometheus metrics
//! exposed on a separate port.

mod config;

use config::Config;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use the_knife_web::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    // Tracing goes to stdout, filtered by RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "the_knife=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting The Knife HTTP server");

    // Configuration, with defaults suited to local development
    let config = Config::from_env();
    info!(
        database_url = %config.database.url,
        "Configuration resolved"
    );

    // Connect to the database
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout))
        .connect(&config.database.url)
        .await?;
    info!("Database connected");

    // Run database migrations
    info!("Running database migrations...");
    the_knife_postgres::migrate(&pool).await?;
    info!("Migrations complete");

    // Initialize Prometheus metrics exporter
    let prometheus_handle = PrometheusBuilder::new().install_recorder()?;
    start_metrics_server(&config, prometheus_handle).await?;

    // Build application state and router
    let state = AppState::new(pool);
    let app = build_router(state);

    // Bind the API address and serve until a shutdown signal lands
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

/// Serve the Prometheus scrape endpoint on the metrics address.
async fn start_metrics_server(
    config: &Config,
    prometheus_handle: PrometheusHandle,
) -> Result<(), Box<dyn std::error::Error>> {
    let metrics_addr = format!(
        "{}:{}",
        config.server.metrics_host, config.server.metrics_port
    );
    let metrics_app = axum::Router::new().route(
        "/metrics",
        axum::routing::get(|| async move { prometheus_handle.render() }),
    );

    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr).await?;
    info!("Prometheus metrics available at http://{}/metrics", metrics_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, metrics_app).await {
            error!(error = %e, "Metrics server error");
        }
    });

    Ok(())
}

/// Resolves once the process is asked to stop.
///
/// Listens for Ctrl+C everywhere, and additionally for SIGTERM on
/// unix since that is what orchestrators send first.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Ctrl+C received, shutting down");
        },
        () = terminate => {
            info!("SIGTERM received, shutting down");
        },
    }
}
