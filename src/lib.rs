//! # tcstore
//!
//! Feature store and trainer-format encoders for text classification
//! experiments.
//!
//! ## Features
//!
//! - Instances with uniquely named numeric, boolean and nominal features
//! - Dense and sparse in-memory feature stores
//! - A stable, persisted feature index shared by training and test data
//! - Writers for LIBLINEAR-style sparse, Mallet dense, SVM-HMM and ARFF files
//! - Configurable feature extraction over text units
//! - Class-distribution filters and confusion-matrix evaluation

pub mod cli;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod extraction;
pub mod feature;
pub mod filter;
pub mod index;
pub mod instance;
pub mod store;
pub mod writer;

pub mod prelude {
    pub use crate::config::{ExperimentConfig, FeatureMode, LearningMode};
    pub use crate::error::{Result, TcError};
    pub use crate::feature::{Feature, FeatureValue};
    pub use crate::index::FeatureIndex;
    pub use crate::instance::Instance;
    pub use crate::store::{FeatureStore, StoreKind, new_store};
    pub use crate::writer::{DataFormat, WriterConfig, encode, encode_with_index};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
