//! Named feature values.
//!
//! A [`Feature`] is the smallest unit produced by a feature extractor: a name
//! and a typed [`FeatureValue`]. Features are immutable once created and
//! compare equal by name only, which is what duplicate detection inside an
//! [`Instance`](crate::instance::Instance) relies on.
//!
//! # Value coercion
//!
//! Every toolkit format ultimately needs a number. [`FeatureValue::coerce`]
//! performs that conversion and reports values it cannot express instead of
//! quietly replacing them:
//!
//! ```
//! use tcstore::feature::{Coerced, FeatureValue};
//!
//! assert_eq!(FeatureValue::Number(0.25).coerce(), Coerced::Value(0.25));
//! assert_eq!(FeatureValue::Boolean(true).coerce(), Coerced::Value(1.0));
//! assert_eq!(FeatureValue::from("BOS").coerce(), Coerced::Unsupported);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TcError};

/// The value carried by a feature.
///
/// Serialized untagged, so JSON `1.5`, `true` and `"noun"` map to
/// `Number`, `Boolean` and `Nominal` respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    /// Numeric value.
    Number(f64),
    /// Boolean value, encoded as 1.0 / 0.0.
    Boolean(bool),
    /// Nominal (string) value.
    Nominal(String),
}

/// Outcome of coercing a [`FeatureValue`] into a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced {
    /// The value as a double.
    Value(f64),
    /// The value has no numeric representation.
    Unsupported,
}

impl FeatureValue {
    /// Coerce to a double: numbers as-is, booleans to 1.0 / 0.0, nominal
    /// values are unsupported.
    pub fn coerce(&self) -> Coerced {
        match self {
            FeatureValue::Number(n) => Coerced::Value(*n),
            FeatureValue::Boolean(b) => Coerced::Value(if *b { 1.0 } else { 0.0 }),
            FeatureValue::Nominal(_) => Coerced::Unsupported,
        }
    }

    /// Whether the value equals its type's zero value.
    pub fn is_zero(&self) -> bool {
        match self {
            FeatureValue::Number(n) => *n == 0.0,
            FeatureValue::Boolean(b) => !*b,
            FeatureValue::Nominal(s) => s.is_empty(),
        }
    }

    /// Get the value as a string slice if it is nominal.
    pub fn as_nominal(&self) -> Option<&str> {
        match self {
            FeatureValue::Nominal(s) => Some(s),
            _ => None,
        }
    }

    /// Short type label used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            FeatureValue::Number(_) => "number",
            FeatureValue::Boolean(_) => "boolean",
            FeatureValue::Nominal(_) => "nominal",
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Number(n) => write!(f, "{n}"),
            FeatureValue::Boolean(b) => write!(f, "{b}"),
            FeatureValue::Nominal(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<i64> for FeatureValue {
    fn from(value: i64) -> Self {
        FeatureValue::Number(value as f64)
    }
}

impl From<usize> for FeatureValue {
    fn from(value: usize) -> Self {
        FeatureValue::Number(value as f64)
    }
}

impl From<bool> for FeatureValue {
    fn from(value: bool) -> Self {
        FeatureValue::Boolean(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Nominal(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Nominal(value)
    }
}

/// A named feature value.
///
/// Equality and hashing consider the name only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawFeature")]
pub struct Feature {
    name: String,
    value: FeatureValue,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    default: bool,
}

#[derive(Deserialize)]
struct RawFeature {
    name: String,
    value: FeatureValue,
    #[serde(default)]
    default: bool,
}

impl TryFrom<RawFeature> for Feature {
    type Error = TcError;

    fn try_from(raw: RawFeature) -> Result<Self> {
        Feature::with_default_flag(raw.name, raw.value, raw.default)
    }
}

impl Feature {
    /// Create a feature. Fails if the name is empty.
    pub fn new<S: Into<String>, V: Into<FeatureValue>>(name: S, value: V) -> Result<Self> {
        Self::with_default_flag(name, value, false)
    }

    /// Create a feature explicitly marked as carrying the default value.
    ///
    /// Extractors use this for features that are absent from a unit but must
    /// still be declared, e.g. n-grams of the vocabulary that do not occur.
    /// The flag may only be set on a zero value (`0.0`, `false`, `""`), so
    /// omitting a default feature never loses information.
    pub fn with_default_flag<S: Into<String>, V: Into<FeatureValue>>(
        name: S,
        value: V,
        default: bool,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(TcError::invalid_feature_name("feature name must not be empty"));
        }
        let value = value.into();
        if default && !value.is_zero() {
            return Err(TcError::unsupported_value(
                name,
                format!("{value} is flagged as default but is not a zero value"),
            ));
        }
        Ok(Self {
            name,
            value,
            default,
        })
    }

    /// The feature name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The feature value.
    pub fn value(&self) -> &FeatureValue {
        &self.value
    }

    /// Whether the feature can be omitted from sparse encodings.
    pub fn is_default(&self) -> bool {
        self.default || self.value.is_zero()
    }
}

impl PartialEq for Feature {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Feature {}

impl Hash for Feature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.value)
    }
}
