//! Model artifact loading and inference.
//!
//! The artifact is a small JSON manifest next to a gradient-boosted model
//! produced by the `gbdt` crate:
//!
//! ```text
//! {
//!   "feature_names": ["MedInc", "HouseAge", "AveRooms", "Latitude", "Longitude"],
//!   "format": "gbdt",
//!   "model_file": "house_price.model"
//! }
//! ```
//!
//! `format` is `gbdt` for a file written by `GBDT::save_model`, or `xgboost_dump`
//! for an XGBoost JSON dump converted for `GBDT::from_xgboost_dump` (with an
//! optional `objective`, default `reg:linear`). `model_file` is relative to the
//! manifest. Feature names must match the input vector order exactly.

use gbdt::decision_tree::{Data, ValueType};
use gbdt::gradient_boost::GBDT;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::models::FeatureName;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model feature names {found:?} do not match expected {expected:?}")]
    FeatureNames {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Failed to load model {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("Model expects {expected} features, got {actual}")]
    InputLength { expected: usize, actual: usize },

    #[error("Model input contains a non-finite value")]
    NonFiniteInput,

    #[error("Model produced no prediction")]
    EmptyOutput,

    #[error("Model produced a non-finite prediction: {0}")]
    NonFiniteOutput(f64),
}

/// A loaded, immutable regression model.
pub trait RegressionModel: Send + Sync {
    /// Predicts a single value from features in [`FeatureName::ORDERED`] order.
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFormat {
    Gbdt,
    XgboostDump,
}

impl ModelFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFormat::Gbdt => "gbdt",
            ModelFormat::XgboostDump => "xgboost_dump",
        }
    }
}

fn default_objective() -> String {
    "reg:linear".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelManifest {
    pub feature_names: Vec<String>,
    pub format: ModelFormat,
    pub model_file: PathBuf,
    #[serde(default = "default_objective")]
    pub objective: String,
}

impl ModelManifest {
    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let manifest: ModelManifest = serde_json::from_str(raw)?;
        manifest.check_feature_order()?;
        Ok(manifest)
    }

    fn check_feature_order(&self) -> Result<(), ModelError> {
        let expected: Vec<String> = FeatureName::ORDERED
            .iter()
            .map(|name| name.as_str().to_string())
            .collect();
        if self.feature_names != expected {
            return Err(ModelError::FeatureNames {
                expected,
                found: self.feature_names.clone(),
            });
        }
        Ok(())
    }

    /// Location of the booster file, relative to the manifest's directory.
    pub fn model_path(&self, manifest_path: &Path) -> PathBuf {
        match manifest_path.parent() {
            Some(dir) if self.model_file.is_relative() => dir.join(&self.model_file),
            _ => self.model_file.clone(),
        }
    }
}

/// `RegressionModel` over a `gbdt` booster.
pub struct GbdtModel {
    booster: GBDT,
    format: ModelFormat,
}

impl GbdtModel {
    pub fn new(booster: GBDT, format: ModelFormat) -> Self {
        Self { booster, format }
    }

    fn open(path: &Path, manifest: &ModelManifest) -> Result<Self, ModelError> {
        let file = path.to_string_lossy();
        let booster = match manifest.format {
            ModelFormat::Gbdt => GBDT::load_model(&file),
            ModelFormat::XgboostDump => GBDT::from_xgboost_dump(&file, &manifest.objective),
        }
        .map_err(|e| ModelError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(Self::new(booster, manifest.format))
    }
}

impl RegressionModel for GbdtModel {
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != FeatureName::COUNT {
            return Err(ModelError::InputLength {
                expected: FeatureName::COUNT,
                actual: features.len(),
            });
        }

        // The booster works in f32; values past its range are as unusable as NaN.
        let row: Vec<ValueType> = features.iter().map(|x| *x as ValueType).collect();
        if row.iter().any(|x| !x.is_finite()) {
            return Err(ModelError::NonFiniteInput);
        }

        let output = self.booster.predict(&vec![Data::new_test_data(row, None)]);
        let prediction = output.first().copied().ok_or(ModelError::EmptyOutput)? as f64;

        if !prediction.is_finite() {
            return Err(ModelError::NonFiniteOutput(prediction));
        }
        Ok(prediction)
    }

    fn describe(&self) -> String {
        self.format.as_str().to_string()
    }
}

/// Reads the manifest at `path` and loads the booster it names. Called once at
/// startup; any error is fatal.
pub fn load_model(path: &Path) -> Result<Arc<dyn RegressionModel>, ModelError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest = ModelManifest::from_json(&raw)?;
    let model_path = manifest.model_path(path);
    let model = GbdtModel::open(&model_path, &manifest)?;

    tracing::info!(
        path = %path.display(),
        model_file = %model_path.display(),
        model = %model.describe(),
        "Loaded model artifact"
    );

    Ok(Arc::new(model))
}
