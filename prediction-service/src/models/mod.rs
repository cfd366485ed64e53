pub mod features;
pub mod prediction;

pub use features::{FeatureCandidate, FeatureName, FeatureSet, FieldValue};
pub use prediction::PredictionResponse;
