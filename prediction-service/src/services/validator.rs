use std::ops::RangeInclusive;

use crate::error::PredictError;
use crate::models::{FeatureCandidate, FeatureName, FeatureSet, FieldValue};

pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Checks a candidate in a fixed order and stops at the first failure:
/// presence of all five keys, latitude bounds, then longitude bounds.
///
/// Validation failures are logged here with the whole candidate. Values that are
/// not numbers are internal errors and are left for the request boundary to log.
pub fn validate(candidate: &FeatureCandidate) -> Result<FeatureSet, PredictError> {
    let missing = candidate.missing();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|name| name.as_str()).collect();
        tracing::error!(missing = ?names, input = %candidate, "Missing fields");
        return Err(PredictError::MissingFields(missing));
    }

    let (latitude, raw) = numeric(candidate, FeatureName::Latitude)?;
    if !LATITUDE_RANGE.contains(&latitude) {
        tracing::error!(latitude = %raw, input = %candidate, "Invalid latitude");
        return Err(PredictError::InvalidLatitude(raw.clone()));
    }

    let (longitude, raw) = numeric(candidate, FeatureName::Longitude)?;
    if !LONGITUDE_RANGE.contains(&longitude) {
        tracing::error!(longitude = %raw, input = %candidate, "Invalid longitude");
        return Err(PredictError::InvalidLongitude(raw.clone()));
    }

    Ok(FeatureSet {
        med_inc: numeric(candidate, FeatureName::MedInc)?.0,
        house_age: numeric(candidate, FeatureName::HouseAge)?.0,
        ave_rooms: numeric(candidate, FeatureName::AveRooms)?.0,
        latitude,
        longitude,
    })
}

fn numeric(
    candidate: &FeatureCandidate,
    name: FeatureName,
) -> Result<(f64, &FieldValue), PredictError> {
    let raw = candidate
        .get(name)
        .ok_or_else(|| anyhow::anyhow!("{} disappeared after presence check", name))?;
    let value = raw
        .as_f64()
        .ok_or_else(|| anyhow::anyhow!("{} is not a number: {}", name, raw))?;
    Ok((value, raw))
}
