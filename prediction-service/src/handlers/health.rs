use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::startup::AppState;

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "prediction-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// The model is loaded before the listener is bound, so a running server is always ready.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ready",
        "model": state.predictor.model().describe()
    }))
}
