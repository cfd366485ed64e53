pub mod extractor;
pub mod metrics;
pub mod model;
pub mod predictor;
pub mod validator;

pub use metrics::{get_metrics, init_metrics, record_prediction};
pub use model::{load_model, GbdtModel, ModelError, ModelFormat, ModelManifest, RegressionModel};
pub use predictor::Predictor;
