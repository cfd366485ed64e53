//! Turns a `/predict` request body into a [`FeatureCandidate`].
//!
//! Form bodies (urlencoded or multipart) are coerced to floats field by field;
//! JSON bodies are taken as-is and type-checked later by the validator.

use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use serde_json::Value;
use thiserror::Error;

use crate::models::{FeatureCandidate, FeatureName, FieldValue};

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART_FORM_DATA: &str = "multipart/form-data";
const APPLICATION_JSON: &str = "application/json";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Malformed JSON body: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("JSON body must be an object, got {0}")]
    NotAnObject(&'static str),

    #[error("Malformed form body: {0}")]
    MalformedForm(#[from] serde_urlencoded::de::Error),

    #[error("Missing form field {0}")]
    MissingFormField(FeatureName),

    #[error("Form field {field} is not a number: {value:?}")]
    InvalidFormValue { field: FeatureName, value: String },

    #[error("Failed to read request body: {0}")]
    Body(#[from] BytesRejection),

    #[error("Malformed multipart body: {0}")]
    MultipartRejected(#[from] MultipartRejection),

    #[error("Malformed multipart field: {0}")]
    Multipart(#[from] MultipartError),
}

/// Media type without parameters, lowercased.
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn is_json(essence: &str) -> bool {
    essence == APPLICATION_JSON || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Reads the request body and extracts a candidate from it.
pub async fn extract_request(request: Request) -> Result<FeatureCandidate, ExtractError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    if content_type.as_deref().map(essence).as_deref() == Some(MULTIPART_FORM_DATA) {
        let pairs = read_multipart(Multipart::from_request(request, &()).await?).await?;
        // Same as an empty urlencoded form.
        if pairs.is_empty() {
            return Err(ExtractError::UnsupportedMediaType(MULTIPART_FORM_DATA.to_string()));
        }
        return from_form(&pairs);
    }

    let body = Bytes::from_request(request, &()).await?;
    extract(content_type.as_deref(), &body)
}

async fn read_multipart(mut multipart: Multipart) -> Result<Vec<(String, String)>, ExtractError> {
    let mut pairs = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        // uploaded files are not form fields
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        pairs.push((name, field.text().await?));
    }
    Ok(pairs)
}

pub fn extract(content_type: Option<&str>, body: &[u8]) -> Result<FeatureCandidate, ExtractError> {
    let essence = content_type.map(essence).unwrap_or_default();

    if essence == FORM_URLENCODED {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;
        // An empty form is treated like any other non-JSON body.
        if !pairs.is_empty() {
            return from_form(&pairs);
        }
    }

    if !is_json(&essence) {
        let shown = if essence.is_empty() {
            "<none>".to_string()
        } else {
            essence
        };
        return Err(ExtractError::UnsupportedMediaType(shown));
    }

    from_json(body)
}

fn from_form(pairs: &[(String, String)]) -> Result<FeatureCandidate, ExtractError> {
    let mut candidate = FeatureCandidate::new();
    for name in FeatureName::ORDERED {
        // first occurrence wins for repeated keys
        let raw = pairs
            .iter()
            .find(|(key, _)| key == name.as_str())
            .map(|(_, value)| value)
            .ok_or(ExtractError::MissingFormField(name))?;

        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| ExtractError::InvalidFormValue {
                field: name,
                value: raw.clone(),
            })?;

        candidate.insert(name.as_str(), FieldValue::Float(value));
    }
    Ok(candidate)
}

fn from_json(body: &[u8]) -> Result<FeatureCandidate, ExtractError> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Object(map) => Ok(FeatureCandidate::from(map)),
        Value::Array(_) => Err(ExtractError::NotAnObject("array")),
        Value::String(_) => Err(ExtractError::NotAnObject("string")),
        Value::Number(_) => Err(ExtractError::NotAnObject("number")),
        Value::Bool(_) => Err(ExtractError::NotAnObject("boolean")),
        Value::Null => Err(ExtractError::NotAnObject("null")),
    }
}
