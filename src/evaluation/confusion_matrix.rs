//! Label confusion matrix and the measures derived from it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Precision, recall and F-measure of one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f_measure: f64,
    /// Number of gold instances with this label.
    pub support: usize,
}

/// Counts of `(gold, predicted)` label pairs.
///
/// The label set grows with every new pair. Measures for labels that only
/// ever appear on one side are 0.0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfusionMatrix {
    labels: BTreeSet<String>,
    /// `(gold, predicted)` -> count
    counts: BTreeMap<(String, String), usize>,
    gold_totals: BTreeMap<String, usize>,
    predicted_totals: BTreeMap<String, usize>,
    total: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a matrix from `(gold, predicted)` pairs.
    pub fn from_pairs<I, G, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (G, P)>,
        G: AsRef<str>,
        P: AsRef<str>,
    {
        let mut matrix = Self::new();
        for (gold, predicted) in pairs {
            matrix.increase_value(gold.as_ref(), predicted.as_ref());
        }
        matrix
    }

    /// Count one instance with gold label `gold` predicted as `predicted`.
    pub fn increase_value(&mut self, gold: &str, predicted: &str) {
        self.labels.insert(gold.to_string());
        self.labels.insert(predicted.to_string());
        *self
            .counts
            .entry((gold.to_string(), predicted.to_string()))
            .or_insert(0) += 1;
        *self.gold_totals.entry(gold.to_string()).or_insert(0) += 1;
        *self.predicted_totals.entry(predicted.to_string()).or_insert(0) += 1;
        self.total += 1;
    }

    /// Count of a `(gold, predicted)` cell.
    pub fn count(&self, gold: &str, predicted: &str) -> usize {
        self.counts
            .get(&(gold.to_string(), predicted.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// All labels seen so far, sorted.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    /// Number of counted instances.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn true_positives(&self, label: &str) -> usize {
        self.count(label, label)
    }

    pub fn gold_total(&self, label: &str) -> usize {
        self.gold_totals.get(label).copied().unwrap_or(0)
    }

    pub fn predicted_total(&self, label: &str) -> usize {
        self.predicted_totals.get(label).copied().unwrap_or(0)
    }

    pub fn precision(&self, label: &str) -> f64 {
        ratio(self.true_positives(label), self.predicted_total(label))
    }

    pub fn recall(&self, label: &str) -> f64 {
        ratio(self.true_positives(label), self.gold_total(label))
    }

    /// Harmonic mean of precision and recall.
    pub fn f_measure(&self, label: &str) -> f64 {
        let precision = self.precision(label);
        let recall = self.recall(label);
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }

    /// Fraction of instances on the diagonal.
    pub fn accuracy(&self) -> f64 {
        let correct: usize = self.labels.iter().map(|l| self.true_positives(l)).sum();
        ratio(correct, self.total)
    }

    fn macro_average(&self, measure: impl Fn(&str) -> f64) -> f64 {
        if self.labels.is_empty() {
            return 0.0;
        }
        self.labels.iter().map(|l| measure(l)).sum::<f64>() / self.labels.len() as f64
    }

    pub fn macro_precision(&self) -> f64 {
        self.macro_average(|l| self.precision(l))
    }

    pub fn macro_recall(&self) -> f64 {
        self.macro_average(|l| self.recall(l))
    }

    pub fn macro_f_measure(&self) -> f64 {
        self.macro_average(|l| self.f_measure(l))
    }

    /// Measures of every label, in label order.
    pub fn label_metrics(&self) -> Vec<LabelMetrics> {
        self.labels
            .iter()
            .map(|label| LabelMetrics {
                label: label.clone(),
                precision: self.precision(label),
                recall: self.recall(label),
                f_measure: self.f_measure(label),
                support: self.gold_total(label),
            })
            .collect()
    }

    /// Per-label precision/recall/F table as plain text.
    pub fn metrics_table(&self) -> String {
        let mut table = format!(
            "{:16} {:>9} {:>9} {:>9} {:>8}\n",
            "label", "precision", "recall", "f1", "support"
        );
        for m in self.label_metrics() {
            table.push_str(&format!(
                "{:16} {:>9.4} {:>9.4} {:>9.4} {:>8}\n",
                truncate(&m.label, 16),
                m.precision,
                m.recall,
                m.f_measure,
                m.support
            ));
        }
        table.push_str(&format!(
            "{:16} {:>9.4} {:>9.4} {:>9.4} {:>8}\n",
            "macro avg",
            self.macro_precision(),
            self.macro_recall(),
            self.macro_f_measure(),
            self.total
        ));
        table
    }

    /// Write the matrix as CSV: one row per gold label, one column per
    /// predicted label.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        let mut header = vec!["gold\\predicted".to_string()];
        header.extend(self.labels.iter().cloned());
        writer.write_record(&header)?;

        for gold in &self.labels {
            let mut record = vec![gold.clone()];
            record.extend(self.labels.iter().map(|p| self.count(gold, p).to_string()));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header
        write!(f, "{:12}", "Gold\\Pred")?;
        for label in &self.labels {
            write!(f, " {:>8}", truncate(label, 8))?;
        }
        writeln!(f)?;

        // Rows
        for gold in &self.labels {
            write!(f, "{:12}", truncate(gold, 12))?;
            for predicted in &self.labels {
                let count = self.count(gold, predicted);
                if gold == predicted {
                    write!(f, " {:>8}", format!("[{count}]"))?;
                } else if count > 0 {
                    write!(f, " {count:>8}")?;
                } else {
                    write!(f, " {:>8}", ".")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
