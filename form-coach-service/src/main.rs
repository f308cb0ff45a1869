//! Form Coach Service entry point.

use form_coach_service::config::FormCoachConfig;
use form_coach_service::services::metrics::init_metrics;
use form_coach_service::startup::Application;

use service_core::middleware::metrics::install_http_metrics_recorder;
use service_core::observability::init_tracing;
use tokio::signal;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load configuration
    let config = FormCoachConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    // Initialize tracing
    init_tracing(
        &config.service.name,
        &config.service.log_level,
        config.service.otlp_endpoint.as_deref(),
    );

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        otlp_enabled = config.service.otlp_endpoint.is_some(),
        "Starting form-coach-service"
    );

    // Initialize metrics
    init_metrics();
    install_http_metrics_recorder();

    // Log configuration (mask sensitive values)
    tracing::info!(
        service_name = %config.service.name,
        http_port = %config.common.port,
        genai_provider = ?config.genai.provider,
        analysis_model = %config.genai.analysis_model,
        coaching_model = %config.genai.coaching_model,
        request_timeout_secs = config.genai.request_timeout.as_secs(),
        store_backend = config.store.backend_name(),
        "Configuration loaded"
    );

    // Build and run application
    let app = Application::build(config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to build application");
        std::io::Error::other(format!("Application build error: {}", e))
    })?;

    if let Err(e) = app.run_until_stopped(shutdown_signal()).await {
        tracing::error!(error = %e, "Application error");
        return Err(e);
    }

    tracing::info!("Service shutdown complete");
    Ok(())
}
