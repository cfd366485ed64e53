//! Outcome taxonomy for `POST /predict`.
//!
//! Validation failures keep their own variants and messages; every other failure
//! collapses into [`PredictError::Internal`] and is reported with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use service_core::error::ErrorEnvelope;
use thiserror::Error;

use crate::models::{FeatureName, FieldValue};
use crate::services::extractor::ExtractError;
use crate::services::model::ModelError;

pub const INTERNAL_ERROR_MESSAGE: &str = "An error occurred during prediction";

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Missing fields in input: [{}]", quoted_list(.0))]
    MissingFields(Vec<FeatureName>),

    #[error("Invalid latitude: {0}. It should be between -90 and 90.")]
    InvalidLatitude(FieldValue),

    #[error("Invalid longitude: {0}. It should be between -180 and 180.")]
    InvalidLongitude(FieldValue),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

fn quoted_list(names: &[FeatureName]) -> String {
    names
        .iter()
        .map(|name| format!("'{}'", name))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<ExtractError> for PredictError {
    fn from(err: ExtractError) -> Self {
        PredictError::Internal(anyhow::Error::new(err))
    }
}

impl From<ModelError> for PredictError {
    fn from(err: ModelError) -> Self {
        PredictError::Internal(anyhow::Error::new(err))
    }
}

impl PredictError {
    pub fn status(&self) -> StatusCode {
        match self {
            PredictError::MissingFields(_)
            | PredictError::InvalidLatitude(_)
            | PredictError::InvalidLongitude(_) => StatusCode::BAD_REQUEST,
            PredictError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metrics label.
    pub fn outcome(&self) -> &'static str {
        match self {
            PredictError::MissingFields(_) => "missing_fields",
            PredictError::InvalidLatitude(_) => "invalid_latitude",
            PredictError::InvalidLongitude(_) => "invalid_longitude",
            PredictError::Internal(_) => "internal_error",
        }
    }

    /// Client-facing message. Internal causes are never exposed.
    pub fn public_message(&self) -> String {
        match self {
            PredictError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = self.status();
        ErrorEnvelope::new(status, self.public_message()).into_response_with(status)
    }
}
