//! Application startup and lifecycle management.

use crate::config::{FormCoachConfig, GenAiConfig, ProviderKind, StoreConfig};
use crate::handlers::{self, analyze::analyze_video, coach::coach_scan, health};
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::mock::MockTextProvider;
use crate::services::store::{InMemoryStore, PgStore, SupabaseConfig, SupabaseStore};
use crate::services::{ScanStore, TextProvider};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::middleware::cors::cors_headers_middleware;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::{request_id_middleware, REQUEST_ID_HEADER};
use service_core::observability::extract_traceparent;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service_name: String,
    pub text_provider: Arc<dyn TextProvider>,
    pub store: Arc<dyn ScanStore>,
}

impl AppState {
    pub fn new(
        service_name: impl Into<String>,
        text_provider: Arc<dyn TextProvider>,
        store: Arc<dyn ScanStore>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            text_provider,
            store,
        }
    }
}

/// Build the HTTP surface: webhook routes, probes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/analyze",
            post(analyze_video)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/coach",
            post(coach_scan)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics_endpoint))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");
                let traceparent =
                    extract_traceparent(request.headers()).unwrap_or_else(|| "-".to_string());

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    traceparent = %traceparent,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(cors_headers_middleware))
}

fn build_text_provider(config: &GenAiConfig) -> Result<Arc<dyn TextProvider>, AppError> {
    match config.provider {
        ProviderKind::Gemini => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!("GEMINI_API_KEY is required"))
            })?;
            let provider = GeminiTextProvider::new(GeminiConfig {
                api_key,
                api_base: config.api_base.clone(),
                analysis_model: config.analysis_model.clone(),
                coaching_model: config.coaching_model.clone(),
                timeout: config.request_timeout,
            })
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("{}", e)))?;

            tracing::info!(
                analysis_model = %config.analysis_model,
                coaching_model = %config.coaching_model,
                "Initialized Gemini text provider"
            );
            Ok(Arc::new(provider))
        }
        ProviderKind::Mock => {
            tracing::warn!("Using mock text provider");
            Ok(Arc::new(MockTextProvider::new(true)))
        }
    }
}

async fn build_store(config: &FormCoachConfig) -> Result<Arc<dyn ScanStore>, AppError> {
    match &config.store {
        StoreConfig::Supabase { url, anon_key } => {
            let store = SupabaseStore::new(SupabaseConfig {
                url: url.clone(),
                anon_key: anon_key.clone(),
                timeout: config.genai.request_timeout,
            })
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("{}", e)))?;
            tracing::info!(url = %url, "Using Supabase store");
            Ok(Arc::new(store))
        }
        StoreConfig::Postgres(db) => {
            let store = PgStore::new(
                db.url.expose_secret(),
                db.max_connections,
                db.min_connections,
            )
            .await?;
            if db.run_migrations {
                store.run_migrations().await?;
            }
            Ok(Arc::new(store))
        }
        StoreConfig::Memory => {
            tracing::warn!("Using in-memory store; rows are lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: FormCoachConfig) -> Result<Self, AppError> {
        let text_provider = build_text_provider(&config.genai)?;
        let store = build_store(&config).await?;
        let state = AppState::new(config.service.name.clone(), text_provider, store);

        // Port 0 binds a random port for testing
        let address = format!("{}:{}", config.common.host, config.common.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port = port,
            store = config.store.backend_name(),
            "Form coach service listening"
        );

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until `shutdown` resolves.
    pub async fn run_until_stopped<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
