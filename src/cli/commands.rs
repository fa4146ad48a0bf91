//! Command implementations for the tcstore CLI.

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::ExperimentConfig;
use crate::error::{Result, TcError};
use crate::evaluation::{
    EvaluationReport, Id2Outcome, read_gold_labels, read_predictions, translate_ids,
};
use crate::extraction::{ExtractionRun, ExtractorRegistry, read_units};
use crate::filter::{FeatureStoreFilter, UniformClassDistributionFilter, apply_all, filter_by_name};
use crate::index::{FEATURE_NAMES_FILE, FeatureIndex};
use crate::store::{FeatureStore, new_store, read_instances, write_instances};
use crate::writer::{DataFormat, OutcomeMap, SparseDataWriter, encode, encode_with_index};

/// Execute a CLI command.
pub fn execute_command(args: TcArgs) -> Result<()> {
    match &args.command {
        Command::Extract(extract_args) => extract(extract_args, &args),
        Command::Encode(encode_args) => encode_instances(encode_args, &args),
        Command::Index(index_args) => build_index(index_args, &args),
        Command::Filter(filter_args) => filter_instances(filter_args, &args),
        Command::Evaluate(evaluate_args) => evaluate(evaluate_args, &args),
    }
}

/// Load a store of the given kind from an instance file.
fn load_store(path: &Path, config: &ExperimentConfig) -> Result<Box<dyn FeatureStore>> {
    let mut store = new_store(config.store_kind);
    read_instances(path, store.as_mut())?;
    store.close();
    Ok(store)
}

/// Run the configured feature set over text units.
fn extract(args: &ExtractArgs, cli_args: &TcArgs) -> Result<()> {
    let start_time = Instant::now();
    let config = ExperimentConfig::from_file(&args.config)?;
    let units = read_units(&args.units)?;

    let mut run = ExtractionRun::from_config(&config, &ExtractorRegistry::default())?;
    if let Some(fit_on) = &args.fit_on {
        run.fit(&read_units(fit_on)?)?;
    }

    let mut store = new_store(config.store_kind);
    run.run(&units, store.as_mut())?;
    store.close();

    if !args.no_filters && !config.filters.is_empty() {
        let filters = config
            .filters
            .iter()
            .map(|name| filter_by_name(name, config.seed))
            .collect::<Result<Vec<_>>>()?;
        apply_all(&filters, store.as_mut())?;
    }

    write_instances(&args.output, store.as_ref())?;

    output_result(
        "Features extracted successfully",
        &ExtractionResult {
            output: args.output.display().to_string(),
            units: units.len(),
            instances: store.size(),
            features: store.feature_names().len(),
            outcomes: store.unique_outcomes().iter().cloned().collect(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Merge the configuration file with the command line overrides.
fn encode_config(args: &EncodeArgs) -> Result<ExperimentConfig> {
    let mut config = match &args.config {
        Some(path) => ExperimentConfig::from_file(path)?,
        None => ExperimentConfig::default(),
    };
    if let Some(format) = args.data_format {
        config.data_format = format;
    }
    if let Some(mode) = args.learning_mode {
        config.learning_mode = mode;
    }
    if let Some(kind) = args.store {
        config.store_kind = kind;
    }
    config.use_dense_instances |= args.dense_instances;
    config.apply_weighting |= args.weighting;
    config.numeric_outcomes |= args.numeric_outcomes;
    config.validate()?;
    Ok(config)
}

/// Encode an instance file.
fn encode_instances(args: &EncodeArgs, cli_args: &TcArgs) -> Result<()> {
    let start_time = Instant::now();
    let config = encode_config(args)?;
    let store = load_store(&args.instances, &config)?;
    let writer_config = config.writer_config();

    let (summary, feature_names) = match &args.feature_names {
        Some(path) => {
            let index = FeatureIndex::read_from(path)?;
            let summary =
                encode_with_index(&args.output_dir, store.as_ref(), &index, config.data_format, &writer_config)?;
            (summary, None)
        }
        None if args.streaming => {
            if config.data_format != DataFormat::Sparse {
                return Err(TcError::invalid_argument(format!(
                    "--streaming is only available for the sparse format, not {}",
                    config.data_format
                )));
            }
            let mut index = FeatureIndex::new();
            let summary = SparseDataWriter::new().write_streaming(
                &args.output_dir,
                store.as_ref(),
                &mut index,
                &writer_config,
            )?;
            let path = args.output_dir.join(FEATURE_NAMES_FILE);
            index.write_to(&path)?;
            (summary, Some(path))
        }
        None => {
            let summary = encode(&args.output_dir, store.as_ref(), config.data_format, &writer_config)?;
            (summary, Some(args.output_dir.join(FEATURE_NAMES_FILE)))
        }
    };

    output_result(
        "Instances encoded successfully",
        &EncodingResult {
            summary,
            feature_names: feature_names.map(|p| p.display().to_string()),
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Build (and optionally save) the feature index of an instance file.
fn build_index(args: &IndexArgs, cli_args: &TcArgs) -> Result<()> {
    let config = ExperimentConfig::default();
    let store = load_store(&args.instances, &config)?;
    let index = FeatureIndex::build(store.as_ref());

    if let Some(output) = &args.output {
        index.write_to(output)?;
    }
    let unknown_occurrences = match &args.check {
        Some(path) => Some(index.count_unknown(load_store(path, &config)?.as_ref())),
        None => None,
    };

    output_result(
        "Feature index built",
        &IndexResult {
            features: index.len(),
            output: args.output.as_ref().map(|p| p.display().to_string()),
            unknown_occurrences,
            names: index.names().to_vec(),
        },
        cli_args,
    )
}

/// Rebalance an instance file.
fn filter_instances(args: &FilterArgs, cli_args: &TcArgs) -> Result<()> {
    let mut store = load_store(&args.instances, &ExperimentConfig::default())?;
    let before = store.size();

    UniformClassDistributionFilter::new(args.seed)
        .with_strategy(args.strategy.into())
        .apply(store.as_mut())?;
    write_instances(&args.output, store.as_ref())?;

    output_result(
        "Instances filtered successfully",
        &FilterResult {
            output: args.output.display().to_string(),
            instances_before: before,
            instances_after: store.size(),
        },
        cli_args,
    )
}

/// Pair predictions with gold labels and score them.
fn evaluate(args: &EvaluateArgs, cli_args: &TcArgs) -> Result<()> {
    let id2outcome = match (&args.id2outcome, &args.gold, &args.predictions) {
        (Some(path), _, _) => Id2Outcome::read_from(path)?,
        (None, Some(gold), Some(predictions)) => {
            let mut gold = read_gold_labels(gold, args.gold_format)?;
            let mut predicted = read_predictions(predictions)?;
            if let Some(map_path) = &args.outcome_map {
                let map = OutcomeMap::read_from(map_path)?;
                gold = translate_ids(&gold, &map)?;
                predicted = translate_ids(&predicted, &map)?;
            }
            Id2Outcome::from_labels(&gold, &predicted)?
        }
        _ => {
            return Err(TcError::invalid_argument(
                "either --id2outcome or both --gold and --predictions are required",
            ));
        }
    };
    if id2outcome.is_empty() {
        return Err(TcError::invalid_argument("no predictions to evaluate"));
    }

    if let Some(path) = &args.save_id2outcome {
        id2outcome.write_to(path)?;
    }
    let matrix = id2outcome.confusion_matrix();
    let report = EvaluationReport::from_matrix(&matrix);
    if let Some(path) = &args.report {
        report.write_json(path)?;
    }
    if let Some(path) = &args.matrix_csv {
        matrix.write_csv(File::create(path)?)?;
    }

    output_evaluation(&report, &matrix.to_string(), &matrix.metrics_table(), cli_args)
}
