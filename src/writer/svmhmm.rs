//! SVM-HMM sequence writer.
//!
//! One line per token, tokens of a sequence contiguous and in position order:
//!
//! ```text
//! <outcome id> qid:<sequence id> <index>:<value> ... # <outcome> <position>
//! ```
//!
//! SVM-HMM rejects feature number 0, so indices here are the [`FeatureIndex`]
//! offsets plus one. Outcome ids come from an [`OutcomeMap`] (starting at 1)
//! that is written next to the feature file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::LearningMode;
use crate::error::{Result, TcError};
use crate::index::FeatureIndex;
use crate::store::{FeatureStore, ValueCoercer};
use crate::writer::{
    DataFormat, DataWriter, OUTCOME_MAP_FILE, OutcomeMap, WriteSummary, WriterConfig,
    check_preconditions, prepare_output, warn_unsupported_weighting,
};

/// Writer for the SVM-HMM sequence format.
#[derive(Debug, Clone, Default)]
pub struct SvmHmmDataWriter;

impl SvmHmmDataWriter {
    pub fn new() -> Self {
        Self
    }
}

/// Instance ids sorted by `(sequence_id, sequence_position)`, keeping store
/// order for ties.
fn sequence_order(store: &dyn FeatureStore) -> Vec<usize> {
    let mut order: Vec<usize> = (0..store.size()).collect();
    order.sort_by_key(|&i| {
        let instance = &store.instances()[i];
        (instance.sequence_id(), instance.sequence_position())
    });
    order
}

impl DataWriter for SvmHmmDataWriter {
    fn format(&self) -> DataFormat {
        DataFormat::SvmHmm
    }

    fn write(
        &self,
        output_dir: &Path,
        store: &dyn FeatureStore,
        index: &FeatureIndex,
        config: &WriterConfig,
    ) -> Result<WriteSummary> {
        check_preconditions(store, config)?;
        if config.learning_mode != LearningMode::SingleLabel {
            return Err(TcError::config(format!(
                "the svmhmm format supports single-label experiments only, not {}",
                config.learning_mode
            )));
        }
        if let Some(i) = store.instances().iter().position(|inst| !inst.in_sequence()) {
            return Err(TcError::invalid_argument(format!(
                "instance {i} is not part of a sequence (sequence id 0)"
            )));
        }
        warn_unsupported_weighting(DataFormat::SvmHmm, config);

        let outcome_map = OutcomeMap::from_store(store);
        let path = prepare_output(output_dir, DataFormat::SvmHmm)?;
        let mut writer = BufWriter::new(File::create(&path)?);
        let mut coercer = ValueCoercer::new(config.nominal_policy);

        for i in sequence_order(store) {
            let instance = &store.instances()[i];
            let outcome = instance.outcome().unwrap_or_default();
            write!(
                writer,
                "{} qid:{}",
                outcome_map.require_id(outcome)?,
                instance.sequence_id()
            )?;
            for (offset, value) in store.row(i, index, &mut coercer)?.entries() {
                if value.abs() > config.sparse_epsilon {
                    write!(writer, " {}:{}", offset + 1, value)?;
                }
            }
            writeln!(
                writer,
                " # {} {}",
                outcome.replace(char::is_whitespace, "_"),
                instance.sequence_position()
            )?;
        }
        writer.flush()?;

        let map_path = output_dir.join(OUTCOME_MAP_FILE);
        outcome_map.write_to(&map_path)?;

        log::info!(
            "wrote {} tokens in svmhmm format to {}",
            store.size(),
            path.display()
        );
        Ok(WriteSummary {
            format: DataFormat::SvmHmm,
            path,
            instances: store.size(),
            features: index.len(),
            outcomes: outcome_map.len(),
            outcome_map: Some(map_path),
        })
    }
}
