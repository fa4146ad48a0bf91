//! LIBLINEAR-style sparse writer.
//!
//! Format is
//! `outcome TAB index:value TAB index:value ...`
//!
//! Indices are 0-based offsets of the [`FeatureIndex`], sorted ascending.
//! Values whose magnitude does not exceed the configured epsilon are omitted.
//!
//! For example:
//! ```text
//! x	0:1
//! y	1:1
//! x	0:1	1:1
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::LearningMode;
use crate::error::Result;
use crate::index::FeatureIndex;
use crate::instance::Instance;
use crate::store::{FeatureStore, Row, ValueCoercer};
use crate::writer::{
    DataFormat, DataWriter, OUTCOME_MAP_FILE, OutcomeMap, WriteSummary, WriterConfig,
    check_outcome_separators, check_preconditions, prepare_output, warn_unsupported_weighting,
};

/// Writer for the sparse `outcome<TAB>index:value` format.
#[derive(Debug, Clone, Default)]
pub struct SparseDataWriter;

impl SparseDataWriter {
    pub fn new() -> Self {
        Self
    }

    /// One-pass variant: extends `index` while streaming the instances.
    ///
    /// Offsets are handed out in the same first-seen order as
    /// [`FeatureIndex::build`], so the output equals that of
    /// [`write`](DataWriter::write) with a precomputed index.
    pub fn write_streaming(
        &self,
        output_dir: &Path,
        store: &dyn FeatureStore,
        index: &mut FeatureIndex,
        config: &WriterConfig,
    ) -> Result<WriteSummary> {
        self.write_rows(output_dir, store, config, |i, coercer| {
            if let Some(instance) = store.instance(i) {
                index.observe(instance);
            }
            let row = store.row(i, index, coercer)?;
            Ok((row, index.len()))
        })
    }

    fn write_rows<F>(
        &self,
        output_dir: &Path,
        store: &dyn FeatureStore,
        config: &WriterConfig,
        mut next_row: F,
    ) -> Result<WriteSummary>
    where
        F: FnMut(usize, &mut ValueCoercer) -> Result<(Row, usize)>,
    {
        check_preconditions(store, config)?;
        if !config.numeric_outcomes {
            let multi_label = config.learning_mode == LearningMode::MultiLabel;
            check_outcome_separators(store, DataFormat::Sparse, multi_label, |c| {
                matches!(c, '\t' | '\n' | '\r') || (multi_label && c == ',')
            })?;
        }
        warn_unsupported_weighting(DataFormat::Sparse, config);

        let outcome_map = config.numeric_outcomes.then(|| OutcomeMap::from_store(store));
        let path = prepare_output(output_dir, DataFormat::Sparse)?;
        let mut writer = BufWriter::new(File::create(&path)?);
        let mut coercer = ValueCoercer::new(config.nominal_policy);
        let mut features = 0;

        for (i, instance) in store.instances().iter().enumerate() {
            let (row, width) = next_row(i, &mut coercer)?;
            features = width;

            write!(writer, "{}", outcome_field(instance, config, outcome_map.as_ref())?)?;
            for (offset, value) in row.entries() {
                if value.abs() > config.sparse_epsilon {
                    write!(writer, "\t{offset}:{value}")?;
                }
            }
            writeln!(writer)?;
        }
        writer.flush()?;

        let outcome_map_path = match &outcome_map {
            Some(map) => {
                let map_path = output_dir.join(OUTCOME_MAP_FILE);
                map.write_to(&map_path)?;
                Some(map_path)
            }
            None => None,
        };

        log::info!("wrote {} instances to {}", store.size(), path.display());
        Ok(WriteSummary {
            format: DataFormat::Sparse,
            path,
            instances: store.size(),
            features,
            outcomes: store.unique_outcomes().len(),
            outcome_map: outcome_map_path,
        })
    }
}

/// The leading outcome column of a line.
fn outcome_field(
    instance: &Instance,
    config: &WriterConfig,
    outcome_map: Option<&OutcomeMap>,
) -> Result<String> {
    let outcomes: Vec<&str> = match config.learning_mode {
        LearningMode::MultiLabel => instance.outcomes().iter().map(String::as_str).collect(),
        _ => instance.outcome().into_iter().collect(),
    };

    match outcome_map {
        Some(map) => {
            let ids = outcomes
                .iter()
                .map(|outcome| map.require_id(outcome).map(|id| id.to_string()))
                .collect::<Result<Vec<_>>>()?;
            Ok(ids.join(","))
        }
        None => Ok(outcomes.join(",")),
    }
}

impl DataWriter for SparseDataWriter {
    fn format(&self) -> DataFormat {
        DataFormat::Sparse
    }

    fn write(
        &self,
        output_dir: &Path,
        store: &dyn FeatureStore,
        index: &FeatureIndex,
        config: &WriterConfig,
    ) -> Result<WriteSummary> {
        self.write_rows(output_dir, store, config, |i, coercer| {
            Ok((store.row(i, index, coercer)?, index.len()))
        })
    }
}
