//! Feature extraction from text units.
//!
//! Extractors implement [`FeatureExtractor`] and are looked up by name in an
//! [`ExtractorRegistry`]. An [`ExtractionRun`] fits a feature set on the
//! training units and turns every unit into an [`Instance`](crate::instance::Instance).
//!
//! # Built-in Extractors
//!
//! - `token_count` - [`style::TokenCountExtractor`]
//! - `character_count` - [`style::CharacterCountExtractor`]
//! - `long_words_ratio` - [`style::LongWordsExtractor`]
//! - `ngram` - [`ngram::NgramExtractor`]
//!
//! # Examples
//!
//! ```
//! use tcstore::config::ExtractorSpec;
//! use tcstore::extraction::{ExtractionRun, ExtractorRegistry, TextUnit};
//! use tcstore::store::{FeatureStore, SparseFeatureStore};
//!
//! let registry = ExtractorRegistry::default();
//! let extractors = registry
//!     .create_all(&[ExtractorSpec::new("token_count")])
//!     .unwrap();
//!
//! let units = vec![TextUnit::new("1", "A short text.").with_outcomes(["x"])];
//! let mut store = SparseFeatureStore::new();
//! ExtractionRun::new(extractors).run(&units, &mut store).unwrap();
//! assert_eq!(store.size(), 1);
//! ```

pub mod extractor;
pub mod ngram;
pub mod registry;
pub mod run;
pub mod style;
pub mod tokenize;
pub mod unit;

pub use extractor::{FeatureExtractor, parse_params};
pub use registry::{ExtractorFactory, ExtractorRegistry};
pub use run::ExtractionRun;
pub use tokenize::{ngrams, tokenize};
pub use unit::{TextUnit, read_units};
