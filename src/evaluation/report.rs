//! Serializable summary of one evaluation.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::evaluation::{ConfusionMatrix, LabelMetrics};

/// Default file name for a JSON report.
pub const REPORT_FILE: &str = "evaluation.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub created_at: DateTime<Utc>,
    pub instances: usize,
    pub accuracy: f64,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_f_measure: f64,
    pub labels: Vec<LabelMetrics>,
    /// `matrix[gold][predicted]` in the order of `labels`.
    pub matrix: Vec<Vec<usize>>,
}

impl EvaluationReport {
    pub fn from_matrix(matrix: &ConfusionMatrix) -> Self {
        let labels: Vec<&str> = matrix.labels().collect();
        let cells = labels
            .iter()
            .map(|gold| labels.iter().map(|p| matrix.count(gold, p)).collect())
            .collect();

        Self {
            created_at: Utc::now(),
            instances: matrix.total(),
            accuracy: matrix.accuracy(),
            macro_precision: matrix.macro_precision(),
            macro_recall: matrix.macro_recall(),
            macro_f_measure: matrix.macro_f_measure(),
            labels: matrix.label_metrics(),
            matrix: cells,
        }
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(serde_json::from_str(&fs::read_to_string(path.as_ref())?)?)
    }
}
