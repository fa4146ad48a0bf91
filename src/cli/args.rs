//! Command line argument parsing for the tcstore CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::LearningMode;
use crate::filter::SamplingStrategy;
use crate::store::StoreKind;
use crate::writer::DataFormat;

/// tcstore - feature store and trainer-format encoders for text classification
#[derive(Parser, Debug, Clone)]
#[command(name = "tcstore")]
#[command(about = "Feature extraction, encoding and evaluation for text classification experiments")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct TcArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl TcArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Extract features from text units into an instance file
    Extract(ExtractArgs),

    /// Encode an instance file into a trainer format
    Encode(EncodeArgs),

    /// Build and save the feature index of an instance file
    Index(IndexArgs),

    /// Rebalance the outcome distribution of an instance file
    Filter(FilterArgs),

    /// Score predictions against gold labels
    Evaluate(EvaluateArgs),
}

/// Arguments for feature extraction
#[derive(Parser, Debug, Clone)]
pub struct ExtractArgs {
    /// Experiment configuration (JSON)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Text units, one JSON object per line
    #[arg(value_name = "UNITS")]
    pub units: PathBuf,

    /// Output instance file (JSONL)
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Units to fit extractors on instead of UNITS (e.g. the training split
    /// when extracting test data)
    #[arg(long, value_name = "FILE")]
    pub fit_on: Option<PathBuf>,

    /// Skip the configured filters (test data)
    #[arg(long)]
    pub no_filters: bool,
}

/// Arguments for encoding
#[derive(Parser, Debug, Clone)]
pub struct EncodeArgs {
    /// Instance file (JSONL)
    #[arg(value_name = "INSTANCES")]
    pub instances: PathBuf,

    /// Output directory
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Experiment configuration (JSON); flags below override it
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Target format (sparse, dense, svmhmm, arff)
    #[arg(short = 't', long = "to", value_name = "FORMAT")]
    pub data_format: Option<DataFormat>,

    /// Learning mode (single_label, multi_label, regression)
    #[arg(short, long)]
    pub learning_mode: Option<LearningMode>,

    /// Store variant used while encoding
    #[arg(long)]
    pub store: Option<StoreKind>,

    /// Encode against an existing feature-names file (test data)
    #[arg(long, value_name = "FILE")]
    pub feature_names: Option<PathBuf>,

    /// Build the feature index while writing (sparse format only)
    #[arg(long, conflicts_with = "feature_names")]
    pub streaming: bool,

    /// Write full-width rows where the format offers a choice
    #[arg(long)]
    pub dense_instances: bool,

    /// Carry instance weights into the output
    #[arg(long)]
    pub weighting: bool,

    /// Replace outcomes by numeric ids (sparse format)
    #[arg(long)]
    pub numeric_outcomes: bool,
}

/// Arguments for index building
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// Instance file (JSONL)
    #[arg(value_name = "INSTANCES")]
    pub instances: PathBuf,

    /// Where to save the feature names (default: print only)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report how many feature occurrences this index would drop from
    /// another instance file
    #[arg(long, value_name = "FILE")]
    pub check: Option<PathBuf>,
}

/// Arguments for filtering
#[derive(Parser, Debug, Clone)]
pub struct FilterArgs {
    /// Instance file (JSONL)
    #[arg(value_name = "INSTANCES")]
    pub instances: PathBuf,

    /// Output instance file (JSONL)
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// How outcome groups are equalized
    #[arg(short, long, default_value = "oversample")]
    pub strategy: Strategy,

    /// Sampling seed
    #[arg(long, default_value = "42")]
    pub seed: u64,
}

/// Arguments for evaluation
#[derive(Parser, Debug, Clone)]
pub struct EvaluateArgs {
    /// id2outcome file with predictions and gold labels
    #[arg(long, value_name = "FILE", conflicts_with_all = ["gold", "predictions"])]
    pub id2outcome: Option<PathBuf>,

    /// Encoded file the gold labels are read from
    #[arg(long, value_name = "FILE", requires = "predictions")]
    pub gold: Option<PathBuf>,

    /// Format of the gold file (sparse or svmhmm)
    #[arg(long, default_value = "sparse")]
    pub gold_format: DataFormat,

    /// Trainer output, one predicted label per line
    #[arg(long, value_name = "FILE", requires = "gold")]
    pub predictions: Option<PathBuf>,

    /// Outcome mapping to translate numeric ids back to labels
    #[arg(long, value_name = "FILE")]
    pub outcome_map: Option<PathBuf>,

    /// Write the paired predictions as an id2outcome file
    #[arg(long, value_name = "FILE")]
    pub save_id2outcome: Option<PathBuf>,

    /// Write a JSON evaluation report
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Write the confusion matrix as CSV
    #[arg(long, value_name = "FILE")]
    pub matrix_csv: Option<PathBuf>,
}

/// Sampling strategies available in CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Duplicate minority instances
    Oversample,
    /// Drop majority instances
    Undersample,
}

impl From<Strategy> for SamplingStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Oversample => SamplingStrategy::Oversample,
            Strategy::Undersample => SamplingStrategy::Undersample,
        }
    }
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
    /// CSV output
    Csv,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_command() {
        let args = TcArgs::try_parse_from([
            "tcstore",
            "encode",
            "train.jsonl",
            "out",
            "--to",
            "svmhmm",
            "--weighting",
        ])
        .unwrap();

        if let Command::Encode(encode_args) = args.command {
            assert_eq!(encode_args.instances, PathBuf::from("train.jsonl"));
            assert_eq!(encode_args.output_dir, PathBuf::from("out"));
            assert_eq!(encode_args.data_format, Some(DataFormat::SvmHmm));
            assert!(encode_args.weighting);
            assert!(encode_args.config.is_none());
        } else {
            panic!("Expected Encode command");
        }
    }

    #[test]
    fn test_encode_format_aliases() {
        let args =
            TcArgs::try_parse_from(["tcstore", "encode", "i.jsonl", "out", "--to", "liblinear"])
                .unwrap();
        if let Command::Encode(encode_args) = args.command {
            assert_eq!(encode_args.data_format, Some(DataFormat::Sparse));
        } else {
            panic!("Expected Encode command");
        }
    }

    #[test]
    fn test_streaming_conflicts_with_feature_names() {
        let result = TcArgs::try_parse_from([
            "tcstore",
            "encode",
            "i.jsonl",
            "out",
            "--streaming",
            "--feature-names",
            "feature-names.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_command() {
        let args = TcArgs::try_parse_from([
            "tcstore",
            "filter",
            "train.jsonl",
            "-o",
            "balanced.jsonl",
            "--strategy",
            "undersample",
        ])
        .unwrap();

        if let Command::Filter(filter_args) = args.command {
            assert_eq!(filter_args.strategy, Strategy::Undersample);
            assert_eq!(filter_args.seed, 42);
        } else {
            panic!("Expected Filter command");
        }
    }

    #[test]
    fn test_evaluate_requires_both_sides() {
        assert!(TcArgs::try_parse_from(["tcstore", "evaluate", "--gold", "g.txt"]).is_err());
        assert!(
            TcArgs::try_parse_from([
                "tcstore",
                "evaluate",
                "--gold",
                "g.txt",
                "--predictions",
                "p.txt"
            ])
            .is_ok()
        );
    }

    #[test]
    fn test_verbosity_levels() {
        let args = TcArgs::try_parse_from(["tcstore", "index", "i.jsonl"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = TcArgs::try_parse_from(["tcstore", "-vvv", "index", "i.jsonl"]).unwrap();
        assert_eq!(args.verbosity(), 3);

        let args = TcArgs::try_parse_from(["tcstore", "-q", "-vv", "index", "i.jsonl"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args = TcArgs::try_parse_from(["tcstore", "-f", "json", "index", "i.jsonl"]).unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
    }
}
