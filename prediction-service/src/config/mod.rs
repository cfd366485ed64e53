use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::{Path, PathBuf};

const SERVICE_DIR: &str = "prediction-service";

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub model: ModelConfig,
    pub templates: TemplateConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model manifest naming the booster file, loaded once at startup.
    pub artifact_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateConfig {
    /// HTML page served on `GET /`, read from disk per request.
    pub index_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Append-only API log. `None` disables the file sink.
    pub file: Option<PathBuf>,
}

impl PredictionConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let log_file = get_env("PREDICTION_LOG_FILE", Some("api.log"), is_prod)?;

        Ok(PredictionConfig {
            common: common_config,
            model: ModelConfig {
                artifact_path: resolve_service_path(&get_env(
                    "MODEL_ARTIFACT_PATH",
                    Some("models/house_price_model.json"),
                    is_prod,
                )?),
            },
            templates: TemplateConfig {
                index_path: resolve_service_path(&get_env(
                    "INDEX_TEMPLATE_PATH",
                    Some("templates/index.html"),
                    is_prod,
                )?),
            },
            logging: LoggingConfig {
                file: (!log_file.is_empty()).then(|| PathBuf::from(log_file)),
            },
        })
    }
}

/// Resolves a relative path against the service directory, whether the process
/// runs from the workspace root or from inside `prediction-service/`.
pub fn resolve_service_path(raw: &str) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        return path.to_path_buf();
    }

    match env::current_dir() {
        Ok(base) if base.ends_with(SERVICE_DIR) => base.join(path),
        Ok(base) if base.join(SERVICE_DIR).is_dir() => base.join(SERVICE_DIR).join(path),
        Ok(base) => base.join(path),
        Err(_) => path.to_path_buf(),
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
