//! Feature store filters.
//!
//! A filter rewrites the instance set of a store after extraction and before
//! encoding, typically to rebalance the outcome distribution of the training
//! data.
//!
//! # Available Filters
//!
//! - [`uniform::UniformClassDistributionFilter`] - Equalizes outcome counts
//!
//! # Examples
//!
//! ```
//! use tcstore::feature::Feature;
//! use tcstore::filter::{FeatureStoreFilter, UniformClassDistributionFilter};
//! use tcstore::instance::Instance;
//! use tcstore::store::{FeatureStore, SparseFeatureStore};
//!
//! let mut store = SparseFeatureStore::new();
//! for outcome in ["A", "A", "B"] {
//!     let f = Feature::new("f", 1.0).unwrap();
//!     store.add_instance(Instance::new(vec![f], [outcome]).unwrap()).unwrap();
//! }
//!
//! UniformClassDistributionFilter::new(7).apply(&mut store).unwrap();
//! assert_eq!(store.size(), 4);
//! ```

pub mod uniform;

use crate::error::{Result, TcError};
use crate::store::FeatureStore;

pub use uniform::{SamplingStrategy, UniformClassDistributionFilter};

/// Trait for post-extraction transformations of a feature store.
pub trait FeatureStoreFilter: std::fmt::Debug {
    /// Rewrite the instances of `store` in place.
    fn apply(&self, store: &mut dyn FeatureStore) -> Result<()>;

    /// Name used to select the filter in a configuration.
    fn name(&self) -> &'static str;

    /// Whether the filter should also run on test data.
    ///
    /// Rebalancing filters change the evaluation distribution and only
    /// apply to training stores.
    fn applicable_to_testing(&self) -> bool {
        false
    }
}

/// Resolve a filter by its configuration name.
///
/// `seed` initializes filters that sample.
pub fn filter_by_name(name: &str, seed: u64) -> Result<Box<dyn FeatureStoreFilter>> {
    match name {
        uniform::OVERSAMPLE_NAME | "uniform" => Ok(Box::new(
            UniformClassDistributionFilter::new(seed).with_strategy(SamplingStrategy::Oversample),
        )),
        uniform::UNDERSAMPLE_NAME => Ok(Box::new(
            UniformClassDistributionFilter::new(seed).with_strategy(SamplingStrategy::Undersample),
        )),
        other => Err(TcError::config(format!("unknown filter: {other}"))),
    }
}

/// Apply `filters` in order.
pub fn apply_all(filters: &[Box<dyn FeatureStoreFilter>], store: &mut dyn FeatureStore) -> Result<()> {
    for filter in filters {
        let before = store.size();
        filter.apply(store)?;
        log::debug!(
            "filter {} changed store size from {} to {}",
            filter.name(),
            before,
            store.size()
        );
    }
    Ok(())
}
