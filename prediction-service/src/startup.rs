//! Application startup and lifecycle management.

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    tracing::{http_trace_layer, request_id_middleware},
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

use crate::config::PredictionConfig;
use crate::handlers;
use crate::services::{load_model, Predictor, RegressionModel};

/// Shared application state. The model inside is read-only for the process lifetime.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Predictor,
    pub index_template: Arc<PathBuf>,
}

impl AppState {
    pub fn new(model: Arc<dyn RegressionModel>, index_template: impl Into<PathBuf>) -> Self {
        Self {
            predictor: Predictor::new(model),
            index_template: Arc::new(index_template.into()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::app::index))
        .route("/predict", post(handlers::predict::predict))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .layer(from_fn(metrics_middleware))
        .layer(http_trace_layer())
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Loads the model artifact named in `config` and binds the listener.
    /// A missing or corrupt artifact aborts startup.
    pub async fn build(config: PredictionConfig) -> Result<Self, AppError> {
        let model = load_model(&config.model.artifact_path).map_err(|e| {
            tracing::error!(
                path = %config.model.artifact_path.display(),
                error = %e,
                "Failed to load model artifact"
            );
            AppError::ModelError(anyhow::Error::new(e))
        })?;

        Self::build_with_model(config, model).await
    }

    /// Same as [`Application::build`] with an already-loaded model.
    pub async fn build_with_model(
        config: PredictionConfig,
        model: Arc<dyn RegressionModel>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(model, config.templates.index_path.clone());
        let router = build_router(state);

        // port 0 = random port for testing
        let address = config.common.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Prediction service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serves until SIGINT/SIGTERM, then drains in-flight requests.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
