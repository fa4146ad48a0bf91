//! Weka/Meka ARFF writer.
//!
//! Each indexed feature becomes an attribute: `numeric` if all its values are
//! numbers or booleans, a nominal `{v1,v2,...}` declaration if all values are
//! strings. Features mixing both are rejected.
//!
//! The outcome attribute depends on the learning mode:
//!
//! - single-label: a nominal `outcome` attribute after the features
//! - regression: a numeric `outcome` attribute after the features
//! - multi-label: one `{0,1}` attribute per label *before* the features, and
//!   the relation name carries `-C <labels>` as Meka expects
//!
//! Rows are dense or sparse (`{index value, ...}`) per
//! `use_dense_instances`. In sparse rows every nominal attribute is written
//! explicitly because ARFF reads an omitted nominal as its first declared
//! value. With weighting enabled each row ends in `, {weight}`.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::LearningMode;
use crate::error::{Result, TcError};
use crate::feature::FeatureValue;
use crate::index::FeatureIndex;
use crate::instance::Instance;
use crate::store::FeatureStore;
use crate::writer::{
    DataFormat, DataWriter, WriteSummary, WriterConfig, check_preconditions, prepare_output,
};

/// Name of the outcome attribute in single-label and regression files.
pub const OUTCOME_ATTRIBUTE: &str = "outcome";

#[derive(Debug, Clone, PartialEq)]
enum AttributeType {
    Numeric,
    Nominal(Vec<String>),
}

/// Writer for attribute-relation files.
#[derive(Debug, Clone, Default)]
pub struct ArffDataWriter;

impl ArffDataWriter {
    pub fn new() -> Self {
        Self
    }
}

/// Quote a name or value if ARFF would otherwise misread it.
fn quote(s: &str) -> String {
    let needs_quotes = s.is_empty()
        || s == "?"
        || s.chars().any(|c| {
            c.is_whitespace() || matches!(c, ',' | '{' | '}' | '\'' | '"' | '%' | '\\')
        });
    if needs_quotes {
        format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
    } else {
        s.to_string()
    }
}

/// Determine the attribute type of every indexed feature.
fn attribute_types(store: &dyn FeatureStore, index: &FeatureIndex) -> Result<Vec<AttributeType>> {
    let mut numeric = vec![false; index.len()];
    let mut nominal: Vec<BTreeSet<String>> = vec![BTreeSet::new(); index.len()];

    for feature in store.instances().iter().flat_map(Instance::features) {
        let Some(offset) = index.offset(feature.name()) else {
            continue;
        };
        match feature.value() {
            FeatureValue::Nominal(value) => {
                nominal[offset].insert(value.clone());
            }
            _ => numeric[offset] = true,
        }
        if numeric[offset] && !nominal[offset].is_empty() {
            return Err(TcError::unsupported_value(
                feature.name(),
                "mixed numeric and nominal values",
            ));
        }
    }

    Ok(numeric
        .into_iter()
        .zip(nominal)
        .map(|(_, values)| {
            if values.is_empty() {
                AttributeType::Numeric
            } else {
                AttributeType::Nominal(values.into_iter().collect())
            }
        })
        .collect())
}

fn numeric_value(value: &FeatureValue) -> f64 {
    match value {
        FeatureValue::Number(n) => *n,
        FeatureValue::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        FeatureValue::Nominal(_) => 0.0,
    }
}

impl DataWriter for ArffDataWriter {
    fn format(&self) -> DataFormat {
        DataFormat::Arff
    }

    fn write(
        &self,
        output_dir: &Path,
        store: &dyn FeatureStore,
        index: &FeatureIndex,
        config: &WriterConfig,
    ) -> Result<WriteSummary> {
        check_preconditions(store, config)?;
        let multi_label = config.learning_mode == LearningMode::MultiLabel;
        if !multi_label && index.offset(OUTCOME_ATTRIBUTE).is_some() {
            return Err(TcError::invalid_feature_name(format!(
                "'{OUTCOME_ATTRIBUTE}' is reserved for the class attribute"
            )));
        }
        let labels: Vec<&String> = store.unique_outcomes().iter().collect();
        if multi_label {
            // label attributes share the namespace of the features
            let collision = labels.iter().find(|label| index.offset(label.as_str()).is_some());
            if let Some(label) = collision {
                return Err(TcError::invalid_feature_name(format!(
                    "'{label}' names both a feature and an outcome label"
                )));
            }
        }
        let types = attribute_types(store, index)?;

        let path = prepare_output(output_dir, DataFormat::Arff)?;
        let mut writer = BufWriter::new(File::create(&path)?);

        // header
        if multi_label {
            let relation = format!("{}: -C {}", config.relation_name, labels.len());
            writeln!(writer, "@relation {}", quote(&relation))?;
            writeln!(writer)?;
            for label in &labels {
                writeln!(writer, "@attribute {} {{0,1}}", quote(label))?;
            }
        } else {
            writeln!(writer, "@relation {}", quote(&config.relation_name))?;
            writeln!(writer)?;
        }
        for (name, attribute) in index.names().iter().zip(&types) {
            match attribute {
                AttributeType::Numeric => writeln!(writer, "@attribute {} numeric", quote(name))?,
                AttributeType::Nominal(values) => {
                    let values: Vec<String> = values.iter().map(|v| quote(v)).collect();
                    writeln!(writer, "@attribute {} {{{}}}", quote(name), values.join(","))?
                }
            }
        }
        match config.learning_mode {
            LearningMode::SingleLabel => {
                let values: Vec<String> = labels.iter().map(|l| quote(l)).collect();
                writeln!(writer, "@attribute {OUTCOME_ATTRIBUTE} {{{}}}", values.join(","))?;
            }
            LearningMode::Regression => writeln!(writer, "@attribute {OUTCOME_ATTRIBUTE} numeric")?,
            LearningMode::MultiLabel => {}
        }
        writeln!(writer)?;
        writeln!(writer, "@data")?;

        // rows as (column, rendered value) pairs
        let feature_base = if multi_label { labels.len() } else { 0 };
        for instance in store.instances() {
            let mut cells: Vec<(usize, String, bool)> = Vec::new();

            if multi_label {
                for (j, label) in labels.iter().enumerate() {
                    let present = instance.outcomes().contains(*label);
                    cells.push((j, if present { "1" } else { "0" }.to_string(), !present));
                }
            }

            let mut values: Vec<Option<&FeatureValue>> = vec![None; index.len()];
            for feature in instance.features() {
                if let Some(offset) = index.offset(feature.name()) {
                    values[offset] = Some(feature.value());
                }
            }
            for (offset, (value, attribute)) in values.iter().zip(&types).enumerate() {
                let column = feature_base + offset;
                match (attribute, value) {
                    (AttributeType::Nominal(_), Some(FeatureValue::Nominal(v))) => {
                        cells.push((column, quote(v), false))
                    }
                    (AttributeType::Nominal(_), _) => cells.push((column, "?".to_string(), false)),
                    (AttributeType::Numeric, Some(v)) => {
                        let n = numeric_value(v);
                        cells.push((column, format!("{n}"), n.abs() <= config.sparse_epsilon))
                    }
                    (AttributeType::Numeric, None) => cells.push((column, "0".to_string(), true)),
                }
            }

            if !multi_label {
                let outcome = instance.outcome().unwrap_or_default();
                let rendered = match config.learning_mode {
                    LearningMode::Regression => outcome.trim().to_string(),
                    _ => quote(outcome),
                };
                cells.push((feature_base + index.len(), rendered, false));
            }

            if config.use_dense_instances {
                let row: Vec<&str> = cells.iter().map(|(_, v, _)| v.as_str()).collect();
                write!(writer, "{}", row.join(","))?;
            } else {
                let row: Vec<String> = cells
                    .iter()
                    .filter(|(_, _, zero)| !zero)
                    .map(|(column, v, _)| format!("{column} {v}"))
                    .collect();
                write!(writer, "{{{}}}", row.join(","))?;
            }
            if config.apply_weighting {
                write!(writer, ", {{{}}}", instance.weight())?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;

        log::info!("wrote {} instances to {}", store.size(), path.display());
        Ok(WriteSummary {
            format: DataFormat::Arff,
            path,
            instances: store.size(),
            features: index.len(),
            outcomes: labels.len(),
            outcome_map: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::feature::Feature;
    use crate::store::SparseFeatureStore;

    fn store() -> SparseFeatureStore {
        let mut store = SparseFeatureStore::new();
        let mut first = Instance::new(
            vec![
                Feature::new("length", 4.0).unwrap(),
                Feature::new("prev", "the").unwrap(),
            ],
            ["pos"],
        )
        .unwrap();
        first.set_weight(2.0);
        store.add_instance(first).unwrap();
        store
            .add_instance(
                Instance::new(vec![Feature::new("length", 0.0).unwrap()], ["neg", "pos"]).unwrap(),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("two words"), "'two words'");
        assert_eq!(quote("it's"), "'it\\'s'");
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn test_single_label_sparse() {
        let dir = tempdir().unwrap();
        let store = store();
        let index = FeatureIndex::build(&store);
        let config = WriterConfig {
            apply_weighting: true,
            ..WriterConfig::default()
        };

        let summary = ArffDataWriter::new()
            .write(dir.path(), &store, &index, &config)
            .unwrap();

        let content = fs::read_to_string(&summary.path).unwrap();
        assert_eq!(
            content,
            "@relation tcstore\n\n\
             @attribute length numeric\n\
             @attribute prev {the}\n\
             @attribute outcome {neg,pos}\n\n\
             @data\n\
             {0 4,1 the,2 pos}, {2}\n\
             {1 ?,2 neg}, {0}\n"
        );
    }

    #[test]
    fn test_multi_label_dense() {
        let dir = tempdir().unwrap();
        let store = store();
        let index = FeatureIndex::build(&store);
        let config = WriterConfig {
            learning_mode: LearningMode::MultiLabel,
            use_dense_instances: true,
            ..WriterConfig::default()
        };

        let summary = ArffDataWriter::new()
            .write(dir.path(), &store, &index, &config)
            .unwrap();

        let content = fs::read_to_string(&summary.path).unwrap();
        assert_eq!(
            content,
            "@relation 'tcstore: -C 2'\n\n\
             @attribute neg {0,1}\n\
             @attribute pos {0,1}\n\
             @attribute length numeric\n\
             @attribute prev {the}\n\n\
             @data\n\
             0,1,4,the\n\
             1,1,0,?\n"
        );
    }

    #[test]
    fn test_mixed_types_rejected() {
        let dir = tempdir().unwrap();
        let mut store = SparseFeatureStore::new();
        store
            .add_instance(Instance::new(vec![Feature::new("f", 1.0).unwrap()], ["x"]).unwrap())
            .unwrap();
        store
            .add_instance(Instance::new(vec![Feature::new("f", "one").unwrap()], ["y"]).unwrap())
            .unwrap();

        let index = FeatureIndex::build(&store);
        let err = ArffDataWriter::new()
            .write(dir.path(), &store, &index, &WriterConfig::default())
            .unwrap_err();
        assert!(matches!(err, TcError::UnsupportedFeatureValue { .. }));
    }

    #[test]
    fn test_multi_label_name_collision_rejected() {
        let dir = tempdir().unwrap();
        let mut store = SparseFeatureStore::new();
        store
            .add_instance(
                Instance::new(
                    vec![Feature::new("pos", 1.0).unwrap(), Feature::new("length", 3.0).unwrap()],
                    ["pos", "neg"],
                )
                .unwrap(),
            )
            .unwrap();

        let index = FeatureIndex::build(&store);
        let config = WriterConfig {
            learning_mode: LearningMode::MultiLabel,
            ..WriterConfig::default()
        };
        let err = ArffDataWriter::new()
            .write(dir.path(), &store, &index, &config)
            .unwrap_err();
        assert!(matches!(err, TcError::InvalidFeatureName(_)));
        assert!(!dir.path().join(DataFormat::Arff.file_name()).exists());

        // single-label output keeps labels out of the attribute list
        let summary = ArffDataWriter::new()
            .write(dir.path(), &store, &index, &WriterConfig::default())
            .unwrap();
        assert!(summary.path.exists());
    }
}
