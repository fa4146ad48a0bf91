//! Experiment configuration.
//!
//! An [`ExperimentConfig`] is read from a JSON file and describes one run:
//! which extractors produce features, which store holds them, which filters
//! post-process the store and which format the trainer expects.
//!
//! ```json
//! {
//!   "learning_mode": "single_label",
//!   "feature_mode": "document",
//!   "data_format": "sparse",
//!   "feature_set": [
//!     { "name": "token_count" },
//!     { "name": "ngram", "params": { "n": 1, "top_k": 500 } }
//!   ],
//!   "filters": ["uniform_class_distribution"],
//!   "seed": 42
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TcError};
use crate::store::{NominalPolicy, StoreKind};
use crate::writer::{DEFAULT_SPARSE_EPSILON, DataFormat, WriterConfig};

/// How outcomes relate to instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningMode {
    /// Exactly one nominal outcome per instance.
    #[default]
    SingleLabel,
    /// Any number of nominal outcomes per instance.
    MultiLabel,
    /// One numeric outcome per instance.
    Regression,
}

impl fmt::Display for LearningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LearningMode::SingleLabel => "single_label",
            LearningMode::MultiLabel => "multi_label",
            LearningMode::Regression => "regression",
        };
        write!(f, "{name}")
    }
}

impl FromStr for LearningMode {
    type Err = TcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "single_label" | "single" => Ok(LearningMode::SingleLabel),
            "multi_label" | "multi" => Ok(LearningMode::MultiLabel),
            "regression" => Ok(LearningMode::Regression),
            other => Err(TcError::config(format!("unknown learning mode: {other}"))),
        }
    }
}

/// What one instance stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureMode {
    /// A whole document.
    #[default]
    Document,
    /// A classification unit inside a document.
    Unit,
    /// A token of a sequence; instances carry sequence id and position.
    Sequence,
    /// A pair of documents.
    Pair,
}

impl fmt::Display for FeatureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureMode::Document => "document",
            FeatureMode::Unit => "unit",
            FeatureMode::Sequence => "sequence",
            FeatureMode::Pair => "pair",
        };
        write!(f, "{name}")
    }
}

impl FromStr for FeatureMode {
    type Err = TcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "document" => Ok(FeatureMode::Document),
            "unit" => Ok(FeatureMode::Unit),
            "sequence" => Ok(FeatureMode::Sequence),
            "pair" => Ok(FeatureMode::Pair),
            other => Err(TcError::config(format!("unknown feature mode: {other}"))),
        }
    }
}

/// A named extractor and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorSpec {
    pub name: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl ExtractorSpec {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            params: serde_json::Value::Null,
        }
    }

    pub fn with_params<S: Into<String>>(name: S, params: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

/// Configuration of one experiment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Outcome semantics.
    pub learning_mode: LearningMode,
    /// Instance granularity.
    pub feature_mode: FeatureMode,
    /// Output format for the trainer.
    pub data_format: DataFormat,
    /// Store implementation.
    pub store_kind: StoreKind,
    /// Full-width rows where the format offers a choice.
    pub use_dense_instances: bool,
    /// Carry instance weights into the output.
    pub apply_weighting: bool,
    /// Magnitude at or below which sparse values are omitted.
    pub sparse_epsilon: f64,
    /// Treatment of nominal values in numeric formats.
    pub nominal_policy: NominalPolicy,
    /// Replace outcomes by numeric ids in the sparse format.
    pub numeric_outcomes: bool,
    /// Extractors, in extraction order.
    pub feature_set: Vec<ExtractorSpec>,
    /// Store filters, applied in order before encoding.
    pub filters: Vec<String>,
    /// Seed for filters that sample.
    pub seed: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            learning_mode: LearningMode::SingleLabel,
            feature_mode: FeatureMode::Document,
            data_format: DataFormat::Sparse,
            store_kind: StoreKind::Sparse,
            use_dense_instances: false,
            apply_weighting: false,
            sparse_epsilon: DEFAULT_SPARSE_EPSILON,
            nominal_policy: NominalPolicy::Zero,
            numeric_outcomes: false,
            feature_set: Vec::new(),
            filters: Vec::new(),
            seed: 42,
        }
    }
}

impl ExperimentConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: ExperimentConfig = serde_json::from_str(&content)?;
        config.validate()?;
        log::debug!(
            "loaded experiment config from {} ({} extractors)",
            path.as_ref().display(),
            config.feature_set.len()
        );
        Ok(config)
    }

    /// Check combinations no writer could honour.
    pub fn validate(&self) -> Result<()> {
        if !self.sparse_epsilon.is_finite() || self.sparse_epsilon < 0.0 {
            return Err(TcError::config(format!(
                "sparse_epsilon must be a non-negative number, got {}",
                self.sparse_epsilon
            )));
        }
        if self.data_format == DataFormat::SvmHmm {
            if self.learning_mode != LearningMode::SingleLabel {
                return Err(TcError::config(
                    "the svmhmm format supports single-label experiments only",
                ));
            }
            if self.feature_mode != FeatureMode::Sequence {
                return Err(TcError::config("the svmhmm format requires feature_mode 'sequence'"));
            }
        }
        if self.numeric_outcomes && self.learning_mode == LearningMode::Regression {
            return Err(TcError::config(
                "numeric_outcomes maps labels to ids and cannot be used for regression",
            ));
        }
        if let Some(spec) = self.feature_set.iter().find(|s| s.name.trim().is_empty()) {
            return Err(TcError::config(format!("extractor without a name: {spec:?}")));
        }
        Ok(())
    }

    /// The writer flags of this experiment.
    pub fn writer_config(&self) -> WriterConfig {
        WriterConfig {
            use_dense_instances: self.use_dense_instances,
            learning_mode: self.learning_mode,
            apply_weighting: self.apply_weighting,
            sparse_epsilon: self.sparse_epsilon,
            nominal_policy: self.nominal_policy,
            numeric_outcomes: self.numeric_outcomes,
            ..WriterConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExperimentConfig::default();
        assert_eq!(config.learning_mode, LearningMode::SingleLabel);
        assert_eq!(config.data_format, DataFormat::Sparse);
        assert_eq!(config.store_kind, StoreKind::Sparse);
        assert_eq!(config.sparse_epsilon, 1e-11);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "learning_mode": "multi_label",
                "data_format": "arff",
                "feature_set": [{{"name": "ngram", "params": {{"n": 2}}}}]
            }}"#
        )
        .unwrap();

        let config = ExperimentConfig::from_file(file.path()).unwrap();
        assert_eq!(config.learning_mode, LearningMode::MultiLabel);
        assert_eq!(config.data_format, DataFormat::Arff);
        assert_eq!(config.feature_set[0].name, "ngram");
        assert_eq!(config.feature_set[0].params["n"], 2);
        assert!(config.filters.is_empty());
    }

    #[test]
    fn test_validate_rejects_svmhmm_without_sequences() {
        let config = ExperimentConfig {
            data_format: DataFormat::SvmHmm,
            ..ExperimentConfig::default()
        };
        assert!(matches!(config.validate(), Err(TcError::Config(_))));

        let config = ExperimentConfig {
            data_format: DataFormat::SvmHmm,
            feature_mode: FeatureMode::Sequence,
            ..ExperimentConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_epsilon() {
        let config = ExperimentConfig {
            sparse_epsilon: -1.0,
            ..ExperimentConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_writer_config_projection() {
        let config = ExperimentConfig {
            learning_mode: LearningMode::Regression,
            apply_weighting: true,
            ..ExperimentConfig::default()
        };
        let writer = config.writer_config();
        assert_eq!(writer.learning_mode, LearningMode::Regression);
        assert!(writer.apply_weighting);
        assert_eq!(writer.relation_name, "tcstore");
    }

    #[test]
    fn test_learning_mode_parse() {
        assert_eq!("multi-label".parse::<LearningMode>().unwrap(), LearningMode::MultiLabel);
        assert_eq!(LearningMode::Regression.to_string(), "regression");
        assert!("ranking".parse::<LearningMode>().is_err());
    }
}
