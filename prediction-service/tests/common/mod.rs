#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use gbdt::config::Config as BoosterConfig;
use gbdt::decision_tree::{Data, DataVec, ValueType};
use gbdt::gradient_boost::GBDT;
use prediction_service::config::{LoggingConfig, ModelConfig, PredictionConfig, TemplateConfig};
use prediction_service::services::load_model;
use prediction_service::startup::{build_router, AppState, Application};
use service_core::config::Config as CommonConfig;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tower::ServiceExt;

/// The feature values of [`VALID_BODY`], in model order.
pub const SAMPLE: [f64; 5] = [8.3, 41.0, 6.98, 37.88, -122.23];

pub const VALID_BODY: &str =
    r#"{"MedInc": 8.3, "HouseAge": 41, "AveRooms": 6.98, "Latitude": 37.88, "Longitude": -122.23}"#;

pub const FORM: &str = "application/x-www-form-urlencoded";

pub const FEATURE_NAMES: [&str; 5] = ["MedInc", "HouseAge", "AveRooms", "Latitude", "Longitude"];

pub const FIXTURE_MODEL_FILE: &str = "house_price.model";

static FIXTURE_MANIFEST: OnceLock<PathBuf> = OnceLock::new();

/// Fresh directory under the system temp dir.
pub fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("prediction-service-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("temp dir writable");
    dir
}

/// Writes a gbdt manifest into `dir` and returns its path.
pub fn write_manifest(dir: &Path, feature_names: &[&str], model_file: &str) -> PathBuf {
    let manifest = serde_json::json!({
        "feature_names": feature_names,
        "format": "gbdt",
        "model_file": model_file,
    });
    let path = dir.join("manifest.json");
    std::fs::write(&path, manifest.to_string()).expect("manifest writable");
    path
}

/// Small booster over synthetic housing rows: price grows with income and
/// drops south of latitude 36.
fn fit_fixture_booster() -> GBDT {
    let mut rows: DataVec = (0..200)
        .map(|i| {
            let med_inc = 1.0 + (i % 10) as ValueType;
            let house_age = (i % 50) as ValueType;
            let ave_rooms = 3.0 + (i % 7) as ValueType;
            let latitude = 32.0 + (i % 9) as ValueType;
            let longitude = -124.0 + (i % 11) as ValueType;
            let label = 0.4 * med_inc + 0.01 * house_age + if latitude > 36.0 { 0.5 } else { 0.0 };
            Data::new_training_data(
                vec![med_inc, house_age, ave_rooms, latitude, longitude],
                1.0,
                label,
                None,
            )
        })
        .collect();

    let mut cfg = BoosterConfig::new();
    cfg.set_feature_size(FEATURE_NAMES.len());
    cfg.set_max_depth(3);
    cfg.set_iterations(20);
    cfg.set_shrinkage(0.3);
    cfg.set_loss("SquaredError");

    let mut booster = GBDT::new(&cfg);
    booster.fit(&mut rows);
    booster
}

/// Directory holding the fitted fixture booster and its manifest, created once
/// per test binary.
pub fn fixture_dir() -> PathBuf {
    fixture_manifest()
        .parent()
        .expect("manifest has a parent")
        .to_path_buf()
}

pub fn fixture_manifest() -> PathBuf {
    FIXTURE_MANIFEST
        .get_or_init(|| {
            let dir = scratch_dir();
            fit_fixture_booster()
                .save_model(&dir.join(FIXTURE_MODEL_FILE).to_string_lossy())
                .expect("fixture model saves");
            write_manifest(&dir, &FEATURE_NAMES, FIXTURE_MODEL_FILE)
        })
        .clone()
}

/// What the fixture model predicts for `features`, straight from the model.
pub fn expected_prediction(features: [f64; 5]) -> f64 {
    load_model(&fixture_manifest())
        .expect("fixture model loads")
        .predict(&features)
        .expect("fixture model predicts")
}

pub fn valid_prediction() -> f64 {
    expected_prediction(SAMPLE)
}

pub fn index_template_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates/index.html")
}

pub fn test_config(artifact_path: PathBuf) -> PredictionConfig {
    PredictionConfig {
        common: CommonConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port
            log_level: "info".to_string(),
            otlp_endpoint: None,
        },
        model: ModelConfig { artifact_path },
        templates: TemplateConfig {
            index_path: index_template_path(),
        },
        logging: LoggingConfig { file: None },
    }
}

/// Router over the fixture model, for `oneshot` tests.
pub fn test_router() -> Router {
    let model = load_model(&fixture_manifest()).expect("fixture model loads");
    build_router(AppState::new(model, index_template_path()))
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("request completes");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("valid request");
    let response = app.oneshot(request).await.expect("request completes");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

pub async fn post(app: Router, content_type: &str, body: impl Into<Body>) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(CONTENT_TYPE, content_type)
        .body(body.into())
        .expect("valid request");
    send(app, request).await
}

pub async fn post_json(app: Router, body: &serde_json::Value) -> (StatusCode, serde_json::Value) {
    post(app, "application/json", body.to_string()).await
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config(fixture_manifest())).await
    }

    pub async fn spawn_with(config: PredictionConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to answer by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        Self { address, port }
    }
}
