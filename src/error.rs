//! Error types for tcstore.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`TcError`] enum. Validation failures (duplicate feature names, an empty
//! outcome set, unsupported values) abort exactly one unit of work: a single
//! `add_feature` call, one instance, or one encode. They never leave an
//! already-committed store in a modified state.
//!
//! # Examples
//!
//! ```
//! use tcstore::error::{Result, TcError};
//!
//! fn encode_nothing() -> Result<()> {
//!     Err(TcError::EmptyOutcomeSet)
//! }
//!
//! match encode_nothing() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for tcstore operations.
#[derive(Error, Debug)]
pub enum TcError {
    /// A feature with the same name already exists on the instance.
    #[error("Duplicate feature name: {0}")]
    DuplicateFeature(String),

    /// An encoder was invoked on a store without any outcome.
    #[error("List of instance outcomes is empty")]
    EmptyOutcomeSet,

    /// A feature value cannot be coerced to a number for the target format.
    #[error("Unsupported value for feature '{name}': {value}")]
    UnsupportedFeatureValue { name: String, value: String },

    /// The store no longer accepts instances.
    #[error("Feature store is closed for writing")]
    StoreClosed,

    /// Feature name that is empty or not representable in the target format.
    #[error("Invalid feature name: {0}")]
    InvalidFeatureName(String),

    /// Outcome that does not fit the learning mode or target format.
    #[error("Invalid outcome: {0}")]
    InvalidOutcome(String),

    /// Malformed input file.
    #[error("Format error: {0}")]
    Format(String),

    /// Invalid or inconsistent configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with TcError.
pub type Result<T> = std::result::Result<T, TcError>;

impl TcError {
    /// Create a new duplicate feature error.
    pub fn duplicate_feature<S: Into<String>>(name: S) -> Self {
        TcError::DuplicateFeature(name.into())
    }

    /// Create a new unsupported value error.
    pub fn unsupported_value<S: Into<String>, V: Into<String>>(name: S, value: V) -> Self {
        TcError::UnsupportedFeatureValue {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create a new invalid feature name error.
    pub fn invalid_feature_name<S: Into<String>>(msg: S) -> Self {
        TcError::InvalidFeatureName(msg.into())
    }

    /// Create a new invalid outcome error.
    pub fn invalid_outcome<S: Into<String>>(msg: S) -> Self {
        TcError::InvalidOutcome(msg.into())
    }

    /// Create a new format error.
    pub fn format<S: Into<String>>(msg: S) -> Self {
        TcError::Format(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        TcError::Config(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        TcError::Other(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        TcError::Other(format!("Invalid argument: {}", msg.into()))
    }
}
