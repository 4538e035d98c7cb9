// Main entry point - Dependency injection, polling session and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use sensor_monitor::application::anomaly_classifier::AnomalyClassifier;
use sensor_monitor::application::monitor_service::MonitorService;
use sensor_monitor::application::poll_session::MonitorSession;
use sensor_monitor::infrastructure::config::load_monitor_config;
use sensor_monitor::infrastructure::http_source::HttpSensorSource;
use sensor_monitor::presentation::app_state::AppState;
use sensor_monitor::presentation::handlers::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sensor_monitor=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = load_monitor_config()?;
    tracing::info!("Polling sensor data from {}", config.source.url);

    // Create source (infrastructure layer)
    let source = Arc::new(HttpSensorSource::new(
        config.source.url.clone(),
        config.source.timeout(),
        config.source.probe_timeout(),
    ));

    // Create services (application layer)
    let monitor_service = MonitorService::new(
        source,
        AnomalyClassifier::new(config.thresholds.clone()),
        config.report.location.clone(),
    );

    let mut session = MonitorSession::new(
        monitor_service.clone(),
        config.polling.dashboard_interval(),
        config.polling.connectivity_interval(),
    );
    session.start();

    // Create application state
    let state = Arc::new(AppState { monitor_service });

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting sensor-monitor service on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested");
        })
        .await?;

    if session.is_running() {
        session.stop();
    }
    Ok(())
}
