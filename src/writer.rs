//! Toolkit-specific training file writers.
//!
//! Each [`DataWriter`] walks a [`FeatureStore`] aligned to a [`FeatureIndex`]
//! and emits one file (plus, where the format needs numeric outcome ids, an
//! outcome mapping) in the grammar of a third-party trainer:
//!
//! | Format | Writer | File | Feature index base |
//! |--------|--------|------|--------------------|
//! | LIBLINEAR-style sparse | [`SparseDataWriter`] | `training-data.txt` | 0 |
//! | Mallet dense, gzip | [`DenseDataWriter`] | `training-data.txt.gz` | n/a |
//! | SVM-HMM sequences | [`SvmHmmDataWriter`] | `feature-vectors.txt` | 1 |
//! | Weka/Meka ARFF | [`ArffDataWriter`] | `training-data.arff` | 0 |
//!
//! All writers check their preconditions before creating any file: a store
//! without outcomes fails with [`TcError::EmptyOutcomeSet`] and leaves the
//! output directory untouched. Output is buffered and flushed before the
//! writer returns. If writing fails halfway the partial file stays on disk
//! and must be treated as invalid.
//!
//! # Example
//!
//! ```no_run
//! use tcstore::store::{new_store, StoreKind};
//! use tcstore::writer::{encode, DataFormat, WriterConfig};
//!
//! # fn main() -> tcstore::error::Result<()> {
//! let store = new_store(StoreKind::Sparse);
//! // ... add instances ...
//! let summary = encode("/tmp/run", store.as_ref(), DataFormat::Sparse, &WriterConfig::default())?;
//! println!("wrote {}", summary.path.display());
//! # Ok(())
//! # }
//! ```

pub mod arff;
pub mod dense;
pub mod outcome_map;
pub mod sparse;
pub mod svmhmm;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::LearningMode;
use crate::error::{Result, TcError};
use crate::index::{FEATURE_NAMES_FILE, FeatureIndex};
use crate::store::{FeatureStore, NominalPolicy};

pub use arff::ArffDataWriter;
pub use dense::DenseDataWriter;
pub use outcome_map::{OUTCOME_MAP_FILE, OutcomeMap};
pub use sparse::SparseDataWriter;
pub use svmhmm::SvmHmmDataWriter;

/// Default threshold below which sparse values are treated as zero.
pub const DEFAULT_SPARSE_EPSILON: f64 = 1e-11;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    /// `outcome<TAB>index:value...` lines (LIBLINEAR).
    #[default]
    Sparse,
    /// Gzip whitespace-separated vectors (Mallet).
    Dense,
    /// Sequence-annotated sparse lines (SVM-HMM).
    SvmHmm,
    /// Attribute-relation file (Weka, Meka).
    Arff,
}

impl DataFormat {
    /// File name the writer for this format produces.
    pub fn file_name(&self) -> &'static str {
        match self {
            DataFormat::Sparse => "training-data.txt",
            DataFormat::Dense => "training-data.txt.gz",
            DataFormat::SvmHmm => "feature-vectors.txt",
            DataFormat::Arff => "training-data.arff",
        }
    }

    /// Whether instance weights survive encoding in this format.
    pub fn supports_weighting(&self) -> bool {
        matches!(self, DataFormat::Arff)
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataFormat::Sparse => "sparse",
            DataFormat::Dense => "dense",
            DataFormat::SvmHmm => "svmhmm",
            DataFormat::Arff => "arff",
        };
        write!(f, "{name}")
    }
}

impl FromStr for DataFormat {
    type Err = TcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sparse" | "liblinear" => Ok(DataFormat::Sparse),
            "dense" | "mallet" => Ok(DataFormat::Dense),
            "svmhmm" | "svm-hmm" => Ok(DataFormat::SvmHmm),
            "arff" | "weka" | "meka" => Ok(DataFormat::Arff),
            other => Err(TcError::config(format!("unknown data format: {other}"))),
        }
    }
}

/// Flags shared by all writers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Write full-width rows where the format offers a choice (ARFF).
    pub use_dense_instances: bool,
    /// Determines how outcomes are validated and encoded.
    pub learning_mode: LearningMode,
    /// Carry instance weights into the output.
    pub apply_weighting: bool,
    /// Values with an absolute value at or below this are omitted from sparse output.
    pub sparse_epsilon: f64,
    /// Treatment of values without a numeric representation.
    pub nominal_policy: NominalPolicy,
    /// Replace outcome strings by numeric ids (sparse format).
    pub numeric_outcomes: bool,
    /// ARFF relation name.
    pub relation_name: String,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            use_dense_instances: false,
            learning_mode: LearningMode::SingleLabel,
            apply_weighting: false,
            sparse_epsilon: DEFAULT_SPARSE_EPSILON,
            nominal_policy: NominalPolicy::Zero,
            numeric_outcomes: false,
            relation_name: "tcstore".to_string(),
        }
    }
}

/// What a writer produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteSummary {
    pub format: DataFormat,
    pub path: PathBuf,
    pub instances: usize,
    pub features: usize,
    pub outcomes: usize,
    pub outcome_map: Option<PathBuf>,
}

/// Serializes a feature store into one toolkit format.
pub trait DataWriter: fmt::Debug {
    /// The format this writer produces.
    fn format(&self) -> DataFormat;

    /// Write `store`, aligned to `index`, into `output_dir`.
    fn write(
        &self,
        output_dir: &Path,
        store: &dyn FeatureStore,
        index: &FeatureIndex,
        config: &WriterConfig,
    ) -> Result<WriteSummary>;
}

/// Create the writer for a format.
pub fn writer_for(format: DataFormat) -> Box<dyn DataWriter> {
    match format {
        DataFormat::Sparse => Box::new(SparseDataWriter::new()),
        DataFormat::Dense => Box::new(DenseDataWriter::new()),
        DataFormat::SvmHmm => Box::new(SvmHmmDataWriter::new()),
        DataFormat::Arff => Box::new(ArffDataWriter::new()),
    }
}

/// Build the index over `store`, persist it as a feature-names file and
/// write the store in `format`.
pub fn encode<P: AsRef<Path>>(
    output_dir: P,
    store: &dyn FeatureStore,
    format: DataFormat,
    config: &WriterConfig,
) -> Result<WriteSummary> {
    check_outcomes(store)?;
    let index = FeatureIndex::build(store);
    let summary = encode_with_index(output_dir.as_ref(), store, &index, format, config)?;
    index.write_to(output_dir.as_ref().join(FEATURE_NAMES_FILE))?;
    Ok(summary)
}

/// Write `store` against an existing index, e.g. a test store against the
/// training feature space. Features unknown to the index are dropped.
pub fn encode_with_index<P: AsRef<Path>>(
    output_dir: P,
    store: &dyn FeatureStore,
    index: &FeatureIndex,
    format: DataFormat,
    config: &WriterConfig,
) -> Result<WriteSummary> {
    let unknown = index.count_unknown(store);
    if unknown > 0 {
        log::info!("dropping {unknown} feature occurrences unknown to the feature index");
    }
    writer_for(format).write(output_dir.as_ref(), store, index, config)
}

/// Fail with [`TcError::EmptyOutcomeSet`] if the store has no outcomes.
pub(crate) fn check_outcomes(store: &dyn FeatureStore) -> Result<()> {
    if store.unique_outcomes().is_empty() {
        return Err(TcError::EmptyOutcomeSet);
    }
    Ok(())
}

/// Common preconditions, checked before any file is created.
pub(crate) fn check_preconditions(store: &dyn FeatureStore, config: &WriterConfig) -> Result<()> {
    check_outcomes(store)?;

    for (i, instance) in store.instances().iter().enumerate() {
        let Some(outcome) = instance.outcome() else {
            return Err(TcError::invalid_outcome(format!("instance {i} has no outcome")));
        };
        if config.learning_mode == LearningMode::Regression && outcome.trim().parse::<f64>().is_err()
        {
            return Err(TcError::invalid_outcome(format!(
                "instance {i}: '{outcome}' is not numeric, but the experiment is a regression"
            )));
        }
    }
    Ok(())
}

/// Fail with [`TcError::InvalidOutcome`] if an outcome written as text is
/// empty or contains a separator of the target grammar. Only the primary
/// outcome is checked unless `all_outcomes` is set.
pub(crate) fn check_outcome_separators(
    store: &dyn FeatureStore,
    format: DataFormat,
    all_outcomes: bool,
    is_separator: impl Fn(char) -> bool,
) -> Result<()> {
    let checked = if all_outcomes { usize::MAX } else { 1 };
    for (i, instance) in store.instances().iter().enumerate() {
        for outcome in instance.outcomes().iter().take(checked) {
            if outcome.is_empty() || outcome.chars().any(&is_separator) {
                return Err(TcError::invalid_outcome(format!(
                    "instance {i}: outcome {outcome:?} cannot be written in the {format} format"
                )));
            }
        }
    }
    Ok(())
}

/// Log that weights are lost in formats that cannot carry them.
pub(crate) fn warn_unsupported_weighting(format: DataFormat, config: &WriterConfig) {
    if config.apply_weighting && !format.supports_weighting() {
        log::warn!("instance weighting is not supported by the {format} format and is ignored");
    }
}

/// Create the output directory if needed and return the output file path.
pub(crate) fn prepare_output(output_dir: &Path, format: DataFormat) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    Ok(output_dir.join(format.file_name()))
}

/// Format a double the way `Double.toString` does on the JVM, which is what
/// Mallet-era tooling expects: `1.0`, `0.25`, `1.0E7`.
pub fn java_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let abs = value.abs();
    if value == 0.0 || (1e-3..1e7).contains(&abs) {
        let s = format!("{value}");
        if s.contains('.') { s } else { format!("{s}.0") }
    } else {
        let s = format!("{value:e}");
        let (mantissa, exponent) = s.split_once('e').unwrap_or((s.as_str(), "0"));
        if mantissa.contains('.') {
            format!("{mantissa}E{exponent}")
        } else {
            format!("{mantissa}.0E{exponent}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_java_double() {
        assert_eq!(java_double(1.0), "1.0");
        assert_eq!(java_double(0.0), "0.0");
        assert_eq!(java_double(0.25), "0.25");
        assert_eq!(java_double(-3.0), "-3.0");
        assert_eq!(java_double(1e7), "1.0E7");
        assert_eq!(java_double(1.5e-5), "1.5E-5");
        assert_eq!(java_double(f64::NAN), "NaN");
    }

    #[test]
    fn test_data_format_parsing() {
        assert_eq!("liblinear".parse::<DataFormat>().unwrap(), DataFormat::Sparse);
        assert_eq!("Mallet".parse::<DataFormat>().unwrap(), DataFormat::Dense);
        assert_eq!("svm-hmm".parse::<DataFormat>().unwrap(), DataFormat::SvmHmm);
        assert_eq!("meka".parse::<DataFormat>().unwrap(), DataFormat::Arff);
        assert!("libsvm2".parse::<DataFormat>().is_err());
    }

    #[test]
    fn test_writer_for_matches_format() {
        for format in [
            DataFormat::Sparse,
            DataFormat::Dense,
            DataFormat::SvmHmm,
            DataFormat::Arff,
        ] {
            assert_eq!(writer_for(format).format(), format);
        }
    }
}
