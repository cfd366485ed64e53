use std::sync::Arc;

use crate::error::PredictError;
use crate::models::FeatureSet;
use crate::services::model::RegressionModel;

/// Runs validated features through the shared model.
#[derive(Clone)]
pub struct Predictor {
    model: Arc<dyn RegressionModel>,
}

impl Predictor {
    pub fn new(model: Arc<dyn RegressionModel>) -> Self {
        Self { model }
    }

    /// Single synchronous inference call, no retries.
    pub fn predict(&self, features: &FeatureSet) -> Result<f64, PredictError> {
        let predicted_price = self.model.predict(&features.to_vector())?;

        tracing::info!(predicted_price, input = %features, "Predicted price");

        Ok(predicted_price)
    }

    pub fn model(&self) -> &Arc<dyn RegressionModel> {
        &self.model
    }
}
