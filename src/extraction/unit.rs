//! Text units, the input of feature extraction.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TcError};

/// A piece of text to classify: a document, a unit, or one token of a
/// sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextUnit {
    #[serde(default)]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub outcomes: Vec<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub sequence_id: u32,
    #[serde(default)]
    pub sequence_position: u32,
}

fn default_weight() -> f64 {
    1.0
}

impl TextUnit {
    pub fn new<S: Into<String>, T: Into<String>>(id: S, text: T) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            weight: default_weight(),
            ..Self::default()
        }
    }

    pub fn with_outcomes<I, S>(mut self, outcomes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outcomes = outcomes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sequence(mut self, sequence_id: u32, position: u32) -> Self {
        self.sequence_id = sequence_id;
        self.sequence_position = position;
        self
    }
}

/// Read text units from a JSON-lines file. Blank lines are skipped.
pub fn read_units<P: AsRef<Path>>(path: P) -> Result<Vec<TextUnit>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let mut units = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut unit: TextUnit = serde_json::from_str(&line).map_err(|e| {
            TcError::format(format!(
                "{}:{}: {e}",
                path.as_ref().display(),
                line_no + 1
            ))
        })?;
        if unit.id.is_empty() {
            unit.id = units.len().to_string();
        }
        units.push(unit);
    }
    log::debug!("read {} text units from {}", units.len(), path.as_ref().display());
    Ok(units)
}
