//! Mallet-style dense writer.
//!
//! The output is gzip-compressed text. The first line lists the feature names
//! in index order followed by the literal token `Outcome`; every further line
//! holds one instance's values in index order followed by its primary
//! outcome:
//!
//! ```text
//! a b Outcome
//! 1.0 0.0 x
//! 0.0 1.0 y
//! ```
//!
//! Numbers print as JVM doubles, booleans as `1.0`/`0.0`. Nominal values have
//! no dense representation and follow the configured
//! [`NominalPolicy`](crate::store::NominalPolicy).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::error::{Result, TcError};
use crate::index::FeatureIndex;
use crate::store::{FeatureStore, ValueCoercer};
use crate::writer::{
    DataFormat, DataWriter, WriteSummary, WriterConfig, check_outcome_separators,
    check_preconditions, java_double, prepare_output, warn_unsupported_weighting,
};

/// Header token closing the list of feature names.
pub const OUTCOME_HEADER: &str = "Outcome";

/// Writer for gzip-compressed whitespace-separated vectors.
#[derive(Debug, Clone, Default)]
pub struct DenseDataWriter;

impl DenseDataWriter {
    pub fn new() -> Self {
        Self
    }
}

impl DataWriter for DenseDataWriter {
    fn format(&self) -> DataFormat {
        DataFormat::Dense
    }

    fn write(
        &self,
        output_dir: &Path,
        store: &dyn FeatureStore,
        index: &FeatureIndex,
        config: &WriterConfig,
    ) -> Result<WriteSummary> {
        check_preconditions(store, config)?;
        if let Some(name) = index.names().iter().find(|n| n.chars().any(char::is_whitespace)) {
            return Err(TcError::invalid_feature_name(format!(
                "'{name}' contains whitespace, which the dense format cannot represent"
            )));
        }
        check_outcome_separators(store, DataFormat::Dense, false, char::is_whitespace)?;
        warn_unsupported_weighting(DataFormat::Dense, config);

        let path = prepare_output(output_dir, DataFormat::Dense)?;
        let file = BufWriter::new(File::create(&path)?);
        let mut encoder = GzEncoder::new(file, Compression::default());

        let mut header: Vec<&str> = index.names().iter().map(String::as_str).collect();
        header.push(OUTCOME_HEADER);
        writeln!(encoder, "{}", header.join(" "))?;

        let mut coercer = ValueCoercer::new(config.nominal_policy);
        for (i, instance) in store.instances().iter().enumerate() {
            let values = store.row(i, index, &mut coercer)?.to_dense(index.len());
            for value in values {
                write!(encoder, "{} ", java_double(value))?;
            }
            writeln!(encoder, "{}", instance.outcome().unwrap_or_default())?;
        }

        let mut file = encoder.finish()?;
        file.flush()?;

        log::info!("wrote {} dense instances to {}", store.size(), path.display());
        Ok(WriteSummary {
            format: DataFormat::Dense,
            path,
            instances: store.size(),
            features: index.len(),
            outcomes: store.unique_outcomes().len(),
            outcome_map: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::GzDecoder;
    use tempfile::tempdir;

    use super::*;
    use crate::feature::Feature;
    use crate::instance::Instance;
    use crate::store::{NominalPolicy, SparseFeatureStore};

    fn read_gz(path: &Path) -> String {
        let mut content = String::new();
        GzDecoder::new(File::open(path).unwrap())
            .read_to_string(&mut content)
            .unwrap();
        content
    }

    #[test]
    fn test_dense_output() {
        let dir = tempdir().unwrap();
        let mut store = SparseFeatureStore::new();
        store
            .add_instance(
                Instance::new(
                    vec![
                        Feature::new("ratio", 0.25).unwrap(),
                        Feature::new("upper", true).unwrap(),
                    ],
                    ["x"],
                )
                .unwrap(),
            )
            .unwrap();
        store
            .add_instance(
                Instance::new(
                    vec![
                        Feature::new("count", 3.0).unwrap(),
                        Feature::new("prev", "BOS").unwrap(),
                    ],
                    ["y"],
                )
                .unwrap(),
            )
            .unwrap();

        let index = FeatureIndex::build(&store);
        let summary = DenseDataWriter::new()
            .write(dir.path(), &store, &index, &WriterConfig::default())
            .unwrap();

        assert_eq!(
            read_gz(&summary.path),
            "ratio upper count prev Outcome\n\
             0.25 1.0 0.0 0.0 x\n\
             0.0 0.0 3.0 0.0 y\n"
        );
    }

    #[test]
    fn test_nominal_rejected_on_request() {
        let dir = tempdir().unwrap();
        let mut store = SparseFeatureStore::new();
        store
            .add_instance(Instance::new(vec![Feature::new("prev", "BOS").unwrap()], ["x"]).unwrap())
            .unwrap();

        let config = WriterConfig {
            nominal_policy: NominalPolicy::Reject,
            ..WriterConfig::default()
        };
        let index = FeatureIndex::build(&store);
        let err = DenseDataWriter::new()
            .write(dir.path(), &store, &index, &config)
            .unwrap_err();
        assert!(matches!(err, TcError::UnsupportedFeatureValue { .. }));
    }

    #[test]
    fn test_whitespace_in_names_rejected() {
        let dir = tempdir().unwrap();
        let mut store = SparseFeatureStore::new();
        store
            .add_instance(
                Instance::new(vec![Feature::new("two words", 1.0).unwrap()], ["x"]).unwrap(),
            )
            .unwrap();

        let index = FeatureIndex::build(&store);
        let err = DenseDataWriter::new()
            .write(dir.path(), &store, &index, &WriterConfig::default())
            .unwrap_err();
        assert!(matches!(err, TcError::InvalidFeatureName(_)));
        assert!(!dir.path().join(DataFormat::Dense.file_name()).exists());
    }

    #[test]
    fn test_whitespace_in_outcomes_rejected() {
        let dir = tempdir().unwrap();
        let mut store = SparseFeatureStore::new();
        store
            .add_instance(Instance::new(vec![Feature::new("a", 1.0).unwrap()], ["very good"]).unwrap())
            .unwrap();

        let index = FeatureIndex::build(&store);
        let err = DenseDataWriter::new()
            .write(dir.path(), &store, &index, &WriterConfig::default())
            .unwrap_err();
        assert!(matches!(err, TcError::InvalidOutcome(_)));
        assert!(!dir.path().join(DataFormat::Dense.file_name()).exists());
    }
}
