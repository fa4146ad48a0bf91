//! Labeled instances.
//!
//! An [`Instance`] is one labeled example (a document, a classification unit,
//! a pair, or one token of a sequence) together with the features extracted
//! for it. Feature names are unique within an instance; the check happens on
//! every mutation so a store never has to repair an instance after the fact.

use std::fmt;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TcError};
use crate::feature::Feature;

/// One labeled example with its features.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawInstance")]
pub struct Instance {
    features: Vec<Feature>,
    #[serde(skip)]
    feature_names: AHashSet<String>,
    outcomes: Vec<String>,
    weight: f64,
    sequence_id: u32,
    sequence_position: u32,
}

#[derive(Deserialize)]
struct RawInstance {
    #[serde(default)]
    features: Vec<Feature>,
    #[serde(default)]
    outcomes: Vec<String>,
    #[serde(default)]
    weight: f64,
    #[serde(default)]
    sequence_id: u32,
    #[serde(default)]
    sequence_position: u32,
}

impl TryFrom<RawInstance> for Instance {
    type Error = TcError;

    fn try_from(raw: RawInstance) -> Result<Self> {
        let mut instance = Instance::new(raw.features, raw.outcomes)?;
        instance.set_weight(raw.weight);
        instance.set_sequence(raw.sequence_id, raw.sequence_position);
        Ok(instance)
    }
}

impl Instance {
    /// Create an instance from features and outcomes.
    ///
    /// Fails with [`TcError::DuplicateFeature`] if two features share a name.
    pub fn new<I, O, S>(features: I, outcomes: O) -> Result<Self>
    where
        I: IntoIterator<Item = Feature>,
        O: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut instance = Instance::default();
        instance.add_features(features)?;
        instance.set_outcomes(outcomes);
        Ok(instance)
    }

    /// Add a single feature.
    pub fn add_feature(&mut self, feature: Feature) -> Result<()> {
        if self.feature_names.contains(feature.name()) {
            return Err(TcError::duplicate_feature(feature.name()));
        }
        self.feature_names.insert(feature.name().to_string());
        self.features.push(feature);
        Ok(())
    }

    /// Add several features at once.
    ///
    /// All names are checked before anything is added, so on error the
    /// instance is left exactly as it was.
    pub fn add_features<I>(&mut self, features: I) -> Result<()>
    where
        I: IntoIterator<Item = Feature>,
    {
        let features: Vec<Feature> = features.into_iter().collect();

        {
            let mut incoming = AHashSet::with_capacity(features.len());
            for feature in &features {
                if self.feature_names.contains(feature.name()) || !incoming.insert(feature.name())
                {
                    return Err(TcError::duplicate_feature(feature.name()));
                }
            }
        }

        self.feature_names
            .extend(features.iter().map(|f| f.name().to_string()));
        self.features.extend(features);
        Ok(())
    }

    /// Features in insertion order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Look up a feature by name.
    pub fn feature(&self, name: &str) -> Option<&Feature> {
        if !self.feature_names.contains(name) {
            return None;
        }
        self.features.iter().find(|f| f.name() == name)
    }

    /// Whether a feature with this name exists.
    pub fn contains_feature(&self, name: &str) -> bool {
        self.feature_names.contains(name)
    }

    /// Whether every feature name occurs once.
    pub fn has_unique_feature_names(&self) -> bool {
        self.feature_names.len() == self.features.len()
    }

    /// The primary outcome, i.e. the first one if several are stored.
    pub fn outcome(&self) -> Option<&str> {
        self.outcomes.first().map(String::as_str)
    }

    /// All outcomes of this instance.
    pub fn outcomes(&self) -> &[String] {
        &self.outcomes
    }

    /// Replace the outcomes of this instance.
    pub fn set_outcomes<O, S>(&mut self, outcomes: O)
    where
        O: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outcomes = outcomes.into_iter().map(Into::into).collect();
    }

    /// Instance weight, only meaningful when weighting is enabled.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// Id of the sequence this instance belongs to, 0 if none.
    pub fn sequence_id(&self) -> u32 {
        self.sequence_id
    }

    /// Position within the sequence. Not meaningful if `sequence_id` is 0.
    pub fn sequence_position(&self) -> u32 {
        self.sequence_position
    }

    /// Place this instance inside a sequence.
    pub fn set_sequence(&mut self, sequence_id: u32, sequence_position: u32) {
        self.sequence_id = sequence_id;
        self.sequence_position = sequence_position;
    }

    /// Whether this instance belongs to a sequence.
    pub fn in_sequence(&self) -> bool {
        self.sequence_id != 0
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} - {}", self.sequence_id, self.sequence_position)?;
        for feature in &self.features {
            writeln!(f, "{feature}")?;
        }
        write!(f, "{}", self.outcomes.join("-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(name: &str, value: f64) -> Feature {
        Feature::new(name, value).unwrap()
    }

    #[test]
    fn test_duplicate_feature_rejected() {
        let mut instance = Instance::new(vec![feature("a", 1.0)], ["x"]).unwrap();

        let err = instance.add_feature(feature("a", 2.0)).unwrap_err();
        assert!(matches!(err, TcError::DuplicateFeature(ref name) if name == "a"));
        assert_eq!(instance.features().len(), 1);
        assert_eq!(instance.features()[0].value().coerce(), crate::feature::Coerced::Value(1.0));
    }

    #[test]
    fn test_failed_batch_leaves_instance_unchanged() {
        let mut instance = Instance::new(vec![feature("a", 1.0)], ["x"]).unwrap();

        // "b" is new but "a" collides, nothing may be added
        let err = instance.add_features(vec![feature("b", 1.0), feature("a", 3.0)]);
        assert!(err.is_err());
        assert_eq!(instance.features().len(), 1);
        assert!(!instance.contains_feature("b"));

        // duplicates inside the batch itself
        let err = instance.add_features(vec![feature("c", 1.0), feature("c", 2.0)]);
        assert!(err.is_err());
        assert!(!instance.contains_feature("c"));

        instance.add_features(vec![feature("b", 1.0), feature("c", 2.0)]).unwrap();
        let names: Vec<&str> = instance.features().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_constructor_rejects_duplicates() {
        let result = Instance::new(vec![feature("a", 1.0), feature("a", 2.0)], ["x"]);
        assert!(matches!(result, Err(TcError::DuplicateFeature(_))));
    }

    #[test]
    fn test_outcomes() {
        let mut instance = Instance::new(Vec::new(), ["sports", "politics"]).unwrap();
        assert_eq!(instance.outcome(), Some("sports"));
        assert_eq!(instance.outcomes().len(), 2);

        instance.set_outcomes(["weather"]);
        assert_eq!(instance.outcomes(), &["weather".to_string()]);

        let empty = Instance::default();
        assert_eq!(empty.outcome(), None);
    }

    #[test]
    fn test_sequence_placement() {
        let mut instance = Instance::new(Vec::new(), ["NN"]).unwrap();
        assert!(!instance.in_sequence());

        instance.set_sequence(4, 2);
        assert!(instance.in_sequence());
        assert_eq!(instance.sequence_id(), 4);
        assert_eq!(instance.sequence_position(), 2);
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{"features":[{"name":"a","value":1},{"name":"b","value":true}],
                       "outcomes":["x"],"weight":2.0,"sequence_id":3,"sequence_position":1}"#;
        let instance: Instance = serde_json::from_str(json).unwrap();
        assert_eq!(instance.features().len(), 2);
        assert!(instance.contains_feature("b"));
        assert_eq!(instance.weight(), 2.0);
        assert_eq!(instance.sequence_id(), 3);

        let json = r#"{"features":[{"name":"a","value":1},{"name":"a","value":2}],"outcomes":["x"]}"#;
        assert!(serde_json::from_str::<Instance>(json).is_err());
    }
}
