//! Prometheus exposition for the prediction service.
//!
//! HTTP request metrics come from `service_core::middleware::metrics`; this
//! module adds per-outcome prediction counters and owns the recorder handle.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the global Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() -> anyhow::Result<()> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

/// Renders the text exposition, or an empty body when no recorder is installed.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

/// Counts a finished `/predict` call by outcome label.
pub fn record_prediction(outcome: &'static str) {
    counter!("predictions_total", "outcome" => outcome).increment(1);
}
