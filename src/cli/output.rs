//! Output formatting for CLI commands.

use std::io;

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, TcArgs};
use crate::error::Result;
use crate::evaluation::EvaluationReport;
use crate::writer::WriteSummary;

/// Result structure for feature extraction.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub output: String,
    pub units: usize,
    pub instances: usize,
    pub features: usize,
    pub outcomes: Vec<String>,
    pub duration_ms: u64,
}

/// Result structure for encoding.
#[derive(Debug, Serialize, Deserialize)]
pub struct EncodingResult {
    #[serde(flatten)]
    pub summary: WriteSummary,
    pub feature_names: Option<String>,
    pub duration_ms: u64,
}

/// Result structure for index building.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResult {
    pub features: usize,
    pub output: Option<String>,
    pub unknown_occurrences: Option<usize>,
    pub names: Vec<String>,
}

/// Result structure for filtering.
#[derive(Debug, Serialize, Deserialize)]
pub struct FilterResult {
    pub output: String,
    pub instances_before: usize,
    pub instances_after: usize,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &TcArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
        OutputFormat::Csv => output_csv(result, args),
    }
}

/// Output an evaluation report; the human form prints the matrix table.
pub fn output_evaluation(report: &EvaluationReport, matrix: &str, table: &str, args: &TcArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("Evaluation of {} instances", report.instances);
                println!();
            }
            println!("{matrix}");
            print!("{table}");
            println!();
            println!("accuracy: {:.4}", report.accuracy);
            Ok(())
        }
        OutputFormat::Json => output_json(report, args),
        OutputFormat::Csv => output_csv(&report.labels, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &TcArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                // long name lists only in verbose mode
                if key == "names" && args.verbosity() < 2 {
                    continue;
                }
                println!("{key}: {}", format_value(&val));
            }
        }
        other => println!("{}", format_value(&other)),
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &TcArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Output in CSV format.
fn output_csv<T: Serialize>(result: &T, _args: &TcArgs) -> Result<()> {
    write_csv(result, io::stdout())
}

/// Write a result as CSV: arrays of objects as one record per item,
/// objects as `key,value` pairs, anything else as a single `value`.
fn write_csv<T: Serialize, W: io::Write>(result: &T, writer: W) -> Result<()> {
    let value = serde_json::to_value(result)?;
    let mut writer = csv::Writer::from_writer(writer);

    match value {
        serde_json::Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                if let Some(obj) = item.as_object() {
                    if i == 0 {
                        writer.write_record(obj.keys())?;
                    }
                    writer.write_record(obj.values().map(csv_field))?;
                }
            }
        }
        serde_json::Value::Object(obj) => {
            writer.write_record(["key", "value"])?;
            for (key, value) in &obj {
                writer.write_record([key.clone(), csv_field(value)])?;
            }
        }
        other => {
            writer.write_record(["value"])?;
            writer.write_record([csv_field(&other)])?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "-".to_string(),
    }
}

/// Render a JSON value as one unquoted CSV field; quoting is left to the writer.
fn csv_field(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join("; ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => String::new(),
        other => format_value(other),
    }
}
