use anyhow::Context;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::{info, warn};

use burger_ratings::{
    create_app, init_observability, repositories::connect, repositories::SchemaManager,
    shutdown_observability, Config, Metrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first (basic logging only)
    let config = Config::from_env().context("failed to load configuration")?;
    println!("Configuration loaded successfully");

    init_observability(&config.observability)?;

    info!(
        "Service: {} v{}",
        config.observability.service_name, config.observability.service_version
    );
    info!("Database: {}", config.database.url);

    let metrics = Arc::new(Metrics::new()?);
    info!("Metrics initialized successfully");

    let pool = connect(&config.database)
        .await
        .context("failed to open database")?;

    if config.database.auto_migrate {
        let tables = SchemaManager::new(pool.clone())
            .create_all_tables()
            .await
            .context("failed to create schema")?;
        info!("Schema ready: {:?}", tables);
    } else {
        info!("Schema migration disabled; expecting tables to exist");
    }

    // Report pool usage until the process exits
    let gauge_pool = pool.clone();
    let gauge_metrics = metrics.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(15));
        loop {
            interval.tick().await;
            let active = gauge_pool.size().saturating_sub(gauge_pool.num_idle() as u32);
            gauge_metrics.set_active_connections(f64::from(active));
        }
    });

    let app = create_app(pool.clone(), metrics, config.server.request_timeout());

    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .with_context(|| format!("invalid host address {}", config.server.host))?,
        config.server.port,
    );

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("server error")?;

    pool.close().await;
    shutdown_observability().await;

    info!("Server shutdown complete");
    Ok(())
}
