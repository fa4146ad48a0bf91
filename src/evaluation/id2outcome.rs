//! `id2outcome` prediction files.
//!
//! The file pairs every instance id with the predicted and the gold label.
//! Labels are stored as integer ids declared in a `#labels` header:
//!
//! ```text
//! #ID=PREDICTION;GOLDSTANDARD
//! #labels 0=cat 1=dog
//! doc1=0;0
//! doc2=1;0
//! ```
//!
//! Other lines starting with `#` are comments. Label names must not contain
//! whitespace or `=`.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TcError};
use crate::evaluation::ConfusionMatrix;

/// Default file name.
pub const ID2OUTCOME_FILE: &str = "id2outcome.txt";

const LABELS_PREFIX: &str = "#labels";
const COLUMNS_COMMENT: &str = "#ID=PREDICTION;GOLDSTANDARD";

/// One predicted instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub predicted: String,
    pub gold: String,
}

/// Predictions of one run in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Id2Outcome {
    predictions: Vec<Prediction>,
}

impl Id2Outcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair gold and predicted labels by position, numbering instances from 0.
    pub fn from_labels(gold: &[String], predicted: &[String]) -> Result<Self> {
        if gold.len() != predicted.len() {
            return Err(TcError::format(format!(
                "{} gold labels but {} predictions",
                gold.len(),
                predicted.len()
            )));
        }
        let mut id2outcome = Self::new();
        for (i, (gold, predicted)) in gold.iter().zip(predicted).enumerate() {
            id2outcome.push(i.to_string(), predicted.clone(), gold.clone());
        }
        Ok(id2outcome)
    }

    pub fn push<I, P, G>(&mut self, id: I, predicted: P, gold: G)
    where
        I: Into<String>,
        P: Into<String>,
        G: Into<String>,
    {
        self.predictions.push(Prediction {
            id: id.into(),
            predicted: predicted.into(),
            gold: gold.into(),
        });
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// Distinct gold and predicted labels, sorted. Position = label id.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .predictions
            .iter()
            .flat_map(|p| [p.predicted.as_str(), p.gold.as_str()])
            .collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    pub fn confusion_matrix(&self) -> ConfusionMatrix {
        ConfusionMatrix::from_pairs(self.predictions.iter().map(|p| (&p.gold, &p.predicted)))
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let labels = self.labels();
        if let Some(label) = labels
            .iter()
            .find(|l| l.is_empty() || l.contains(char::is_whitespace) || l.contains('='))
        {
            return Err(TcError::invalid_outcome(format!(
                "'{label}' cannot be stored in an id2outcome file"
            )));
        }
        if let Some(p) = self.predictions.iter().find(|p| p.id.contains('=')) {
            return Err(TcError::invalid_argument(format!(
                "instance id '{}' contains '='",
                p.id
            )));
        }
        let label_id = |label: &str| labels.binary_search(&label).unwrap_or_default();

        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        writeln!(writer, "{COLUMNS_COMMENT}")?;
        write!(writer, "{LABELS_PREFIX}")?;
        for (id, label) in labels.iter().enumerate() {
            write!(writer, " {id}={label}")?;
        }
        writeln!(writer)?;
        for p in &self.predictions {
            writeln!(
                writer,
                "{}={};{}",
                p.id,
                label_id(p.predicted.as_str()),
                label_id(p.gold.as_str())
            )?;
        }
        writer.flush()?;
        log::debug!(
            "wrote {} predictions to {}",
            self.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let mut labels: Vec<(usize, String)> = Vec::new();
        let mut id2outcome = Self::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if let Some(rest) = line.strip_prefix(LABELS_PREFIX) {
                labels = parse_labels(rest, line_no + 1)?;
                continue;
            }
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let malformed = || {
                TcError::format(format!(
                    "line {}: expected 'id=prediction;gold', got '{line}'",
                    line_no + 1
                ))
            };
            let (id, outcomes) = line.rsplit_once('=').ok_or_else(malformed)?;
            let (predicted, gold) = outcomes.split_once(';').ok_or_else(malformed)?;
            id2outcome.push(
                id,
                resolve(&labels, predicted, line_no + 1)?,
                resolve(&labels, gold, line_no + 1)?,
            );
        }
        Ok(id2outcome)
    }
}

fn parse_labels(declarations: &str, line_no: usize) -> Result<Vec<(usize, String)>> {
    declarations
        .split_whitespace()
        .map(|declaration| {
            let parsed = declaration
                .split_once('=')
                .and_then(|(id, label)| id.parse::<usize>().ok().map(|id| (id, label.to_string())));
            parsed.ok_or_else(|| {
                TcError::format(format!("line {line_no}: invalid label declaration '{declaration}'"))
            })
        })
        .collect()
}

/// Map a label id to its name. Without a `#labels` header, values are taken
/// as label names.
fn resolve(labels: &[(usize, String)], value: &str, line_no: usize) -> Result<String> {
    if labels.is_empty() {
        return Ok(value.to_string());
    }
    let id = value
        .parse::<usize>()
        .map_err(|_| TcError::format(format!("line {line_no}: '{value}' is not a label id")))?;
    labels
        .iter()
        .find(|(label_id, _)| *label_id == id)
        .map(|(_, label)| label.clone())
        .ok_or_else(|| TcError::format(format!("line {line_no}: undeclared label id {id}")))
}
