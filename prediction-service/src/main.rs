use prediction_service::config::PredictionConfig;
use prediction_service::services::init_metrics;
use prediction_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = PredictionConfig::load().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "prediction-service",
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
        config.logging.file.as_deref(),
    )?;

    init_metrics()?;

    let app = Application::build(config).await?;
    app.run_until_stopped().await?;

    Ok(())
}
