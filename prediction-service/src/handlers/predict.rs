//! `POST /predict`: the request boundary.
//!
//! Everything below this handler returns `Result<_, PredictError>`; this is the
//! only place outcomes are counted and internal errors are logged.

use axum::{
    extract::{Request, State},
    Json,
};

use crate::error::PredictError;
use crate::models::PredictionResponse;
use crate::services::{extractor, record_prediction, validator, Predictor};
use crate::startup::AppState;

pub async fn predict(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<PredictionResponse>, PredictError> {
    let outcome = run(&state.predictor, request).await;

    match &outcome {
        Ok(_) => record_prediction("success"),
        Err(err) => record_prediction(err.outcome()),
    }

    outcome.map(|predicted_price| Json(PredictionResponse::new(predicted_price)))
}

async fn run(predictor: &Predictor, request: Request) -> Result<f64, PredictError> {
    let candidate = extractor::extract_request(request).await.map_err(|err| {
        tracing::error!(error = %err, input = "Unavailable", "Error during prediction");
        PredictError::from(err)
    })?;

    let result = validator::validate(&candidate).and_then(|features| predictor.predict(&features));

    // Validation failures were already logged by the validator.
    if let Err(PredictError::Internal(err)) = &result {
        let cause = format!("{:#}", err);
        tracing::error!(error = %cause, input = %candidate, "Error during prediction");
    }

    result
}
