//! Readers for trainer output and gold labels.
//!
//! Trainers write one prediction per line, in the order of the encoded
//! instances. Gold labels are taken from the training-format file that was
//! fed to the trainer, so both sides line up by position.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, TcError};
use crate::writer::{DataFormat, OutcomeMap};

/// Read one predicted label per line.
///
/// Only the first column counts; probability columns after it are ignored,
/// as is a leading `labels ...` header line. Lines containing a TAB are
/// split on TAB, matching the sparse training format, so labels with
/// spaces survive; other lines are split on whitespace.
pub fn read_predictions<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let mut labels = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line_no == 0 && line.starts_with("labels ") {
            continue;
        }
        if let Some(label) = prediction_label(&line) {
            labels.push(label.to_string());
        }
    }
    log::debug!("read {} predictions from {}", labels.len(), path.as_ref().display());
    Ok(labels)
}

fn prediction_label(line: &str) -> Option<&str> {
    if line.contains('\t') {
        line.split('\t').next().filter(|label| !label.trim().is_empty())
    } else {
        line.split_whitespace().next()
    }
}

/// Read the gold labels of a sparse or SVM-HMM training file.
///
/// Sparse lines start with the outcome column (comma-joined for multi-label
/// data), SVM-HMM lines with the numeric outcome id. Formats without a
/// leading outcome column are rejected.
pub fn read_gold_labels<P: AsRef<Path>>(path: P, format: DataFormat) -> Result<Vec<String>> {
    let separator: fn(char) -> bool = match format {
        DataFormat::Sparse => |c| c == '\t',
        DataFormat::SvmHmm => char::is_whitespace,
        other => {
            return Err(TcError::invalid_argument(format!(
                "gold labels cannot be read from {other} files"
            )));
        }
    };

    let reader = BufReader::new(File::open(path.as_ref())?);
    let mut labels = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let label = line.split(separator).next().unwrap_or_default();
        labels.push(label.to_string());
    }
    Ok(labels)
}

/// Translate numeric outcome ids back to labels.
///
/// Multi-label values (`1,3`) are translated element-wise.
pub fn translate_ids(labels: &[String], outcome_map: &OutcomeMap) -> Result<Vec<String>> {
    labels
        .iter()
        .map(|value| {
            let translated = value
                .split(',')
                .map(|id| {
                    id.trim()
                        .parse::<u32>()
                        .ok()
                        .and_then(|id| outcome_map.label(id))
                        .ok_or_else(|| {
                            TcError::invalid_outcome(format!("'{id}' is not a known outcome id"))
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(translated.join(","))
        })
        .collect()
}
