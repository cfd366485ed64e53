use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Successful prediction body: `{"code": 200, "predicted_price": 4.526}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub code: u16,
    pub predicted_price: f64,
}

impl PredictionResponse {
    pub fn new(predicted_price: f64) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            predicted_price,
        }
    }
}
