use serde_json::{Map, Value};
use std::fmt;

/// The five inputs the model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureName {
    MedInc,
    HouseAge,
    AveRooms,
    Latitude,
    Longitude,
}

impl FeatureName {
    /// Model input-vector order.
    pub const ORDERED: [FeatureName; 5] = [
        FeatureName::MedInc,
        FeatureName::HouseAge,
        FeatureName::AveRooms,
        FeatureName::Latitude,
        FeatureName::Longitude,
    ];

    pub const COUNT: usize = Self::ORDERED.len();

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureName::MedInc => "MedInc",
            FeatureName::HouseAge => "HouseAge",
            FeatureName::AveRooms => "AveRooms",
            FeatureName::Latitude => "Latitude",
            FeatureName::Longitude => "Longitude",
        }
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single unvalidated input value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Already coerced to a float (form input).
    Float(f64),
    /// Raw JSON value, type not yet checked.
    Json(Value),
}

impl FieldValue {
    /// Numeric view of the value. Booleans count as 1 and 0; strings, null, arrays
    /// and objects are not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Json(Value::Number(n)) => n.as_f64(),
            FieldValue::Json(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::Json(_) => None,
        }
    }
}

/// Renders a float the way it is echoed back to clients: always with a fractional
/// part or exponent (`91.0`, `1e+16`, `1e-05`), and `nan` / `inf` for non-finite values.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let abs = v.abs();
    if abs == 0.0 || (1e-4..1e16).contains(&abs) {
        // Debug keeps the fractional part: 91.0 rather than 91
        return format!("{:?}", v);
    }

    let sci = format!("{:e}", v);
    match sci.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or_default();
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => sci,
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(v) => f.write_str(&format_float(*v)),
            FieldValue::Json(v) => write!(f, "{}", v),
        }
    }
}

/// Key/value mapping produced by the extractor. Keys are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCandidate {
    fields: Vec<(String, FieldValue)>,
}

impl FeatureCandidate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, name: FeatureName) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == name.as_str())
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: FeatureName) -> bool {
        self.get(name).is_some()
    }

    /// Required features absent from the mapping, in model order.
    pub fn missing(&self) -> Vec<FeatureName> {
        FeatureName::ORDERED
            .into_iter()
            .filter(|name| !self.contains(*name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for FeatureCandidate {
    fn from(map: Map<String, Value>) -> Self {
        let mut candidate = FeatureCandidate::new();
        for (key, value) in map {
            candidate.insert(key, FieldValue::Json(value));
        }
        candidate
    }
}

impl fmt::Display for FeatureCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{}': {}", key, value)?;
        }
        f.write_str("}")
    }
}

/// Validated model input. Every field is a real number and the coordinates are in range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSet {
    pub med_inc: f64,
    pub house_age: f64,
    pub ave_rooms: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl FeatureSet {
    /// Values in [`FeatureName::ORDERED`] order.
    pub fn to_vector(&self) -> [f64; FeatureName::COUNT] {
        [
            self.med_inc,
            self.house_age,
            self.ave_rooms,
            self.latitude,
            self.longitude,
        ]
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in FeatureName::ORDERED
            .iter()
            .zip(self.to_vector())
            .enumerate()
        {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{}': {}", name, format_float(value))?;
        }
        f.write_str("}")
    }
}
