//! Scoring of predictions read back from a trainer.
//!
//! The usual flow: read the gold labels from the encoded training-format
//! file, read the trainer's predictions, pair them into an [`Id2Outcome`],
//! and derive a [`ConfusionMatrix`] and an [`EvaluationReport`] from it.
//!
//! ```no_run
//! use tcstore::evaluation::{Id2Outcome, EvaluationReport, read_gold_labels, read_predictions};
//! use tcstore::writer::DataFormat;
//!
//! # fn main() -> tcstore::error::Result<()> {
//! let gold = read_gold_labels("run/training-data.txt", DataFormat::Sparse)?;
//! let predicted = read_predictions("run/predictions.txt")?;
//! let id2outcome = Id2Outcome::from_labels(&gold, &predicted)?;
//! let matrix = id2outcome.confusion_matrix();
//! println!("{matrix}");
//! println!("accuracy: {:.4}", matrix.accuracy());
//! EvaluationReport::from_matrix(&matrix).write_json("run/evaluation.json")?;
//! # Ok(())
//! # }
//! ```

pub mod confusion_matrix;
pub mod id2outcome;
pub mod predictions;
pub mod report;

pub use confusion_matrix::{ConfusionMatrix, LabelMetrics};
pub use id2outcome::{ID2OUTCOME_FILE, Id2Outcome, Prediction};
pub use predictions::{read_gold_labels, read_predictions, translate_ids};
pub use report::{EvaluationReport, REPORT_FILE};
