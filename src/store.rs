//! Feature stores.
//!
//! A feature store holds every [`Instance`] of one extraction run and keeps
//! the global bookkeeping the encoders need: the set of outcome labels and the
//! set of feature names seen so far.
//!
//! # Architecture
//!
//! - **FeatureStore trait**: shared contract, with the bookkeeping provided by
//!   default methods over an [`InstanceTable`]
//! - **DenseFeatureStore**: materializes full-width rows
//! - **SparseFeatureStore**: materializes only non-default entries
//! - **StoreKind / new_store**: configuration-driven construction
//!
//! The two variants hold identical data and differ only in how a row is
//! materialized for encoding.
//!
//! # Example
//!
//! ```
//! use tcstore::feature::Feature;
//! use tcstore::index::FeatureIndex;
//! use tcstore::instance::Instance;
//! use tcstore::store::{new_store, NominalPolicy, StoreKind, ValueCoercer};
//!
//! # fn main() -> tcstore::error::Result<()> {
//! let mut store = new_store(StoreKind::Sparse);
//! store.add_instance(Instance::new(vec![Feature::new("a", 1.0)?], ["x"])?)?;
//! store.add_instance(Instance::new(vec![Feature::new("b", 2.0)?], ["y"])?)?;
//!
//! let index = FeatureIndex::build(store.as_ref());
//! let mut coercer = ValueCoercer::new(NominalPolicy::Zero);
//! let row = store.row(1, &index, &mut coercer)?;
//! assert_eq!(row.entries(), vec![(1, 2.0)]);
//! # Ok(())
//! # }
//! ```

pub mod dense;
pub mod jsonl;
pub mod sparse;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TcError};
use crate::feature::{Coerced, Feature};
use crate::index::FeatureIndex;
use crate::instance::Instance;

pub use dense::DenseFeatureStore;
pub use jsonl::{read_instances, write_instances};
pub use sparse::SparseFeatureStore;

/// Which store variant to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Dense,
    #[default]
    Sparse,
}

impl FromStr for StoreKind {
    type Err = TcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dense" => Ok(StoreKind::Dense),
            "sparse" => Ok(StoreKind::Sparse),
            other => Err(TcError::config(format!("unknown feature store kind: {other}"))),
        }
    }
}

/// Create an empty store of the given kind.
pub fn new_store(kind: StoreKind) -> Box<dyn FeatureStore> {
    match kind {
        StoreKind::Dense => Box::new(DenseFeatureStore::new()),
        StoreKind::Sparse => Box::new(SparseFeatureStore::new()),
    }
}

/// How to encode feature values that have no numeric representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NominalPolicy {
    /// Encode as 0.0 and log a warning once per feature name.
    #[default]
    Zero,
    /// Fail with [`TcError::UnsupportedFeatureValue`].
    Reject,
}

/// Applies a [`NominalPolicy`] while rows are materialized.
#[derive(Debug, Default)]
pub struct ValueCoercer {
    policy: NominalPolicy,
    warned: AHashSet<String>,
}

impl ValueCoercer {
    pub fn new(policy: NominalPolicy) -> Self {
        Self {
            policy,
            warned: AHashSet::new(),
        }
    }

    /// Numeric value of a feature under the configured policy.
    pub fn coerce(&mut self, feature: &Feature) -> Result<f64> {
        match feature.value().coerce() {
            Coerced::Value(v) => Ok(v),
            Coerced::Unsupported => match self.policy {
                NominalPolicy::Zero => {
                    if self.warned.insert(feature.name().to_string()) {
                        log::warn!(
                            "feature '{}' has a {} value; encoding it as 0.0",
                            feature.name(),
                            feature.value().type_name()
                        );
                    }
                    Ok(0.0)
                }
                NominalPolicy::Reject => Err(TcError::unsupported_value(
                    feature.name(),
                    feature.value().to_string(),
                )),
            },
        }
    }

    /// Feature names that were encoded as 0.0 because of their type.
    pub fn degraded_features(&self) -> usize {
        self.warned.len()
    }
}

/// A materialized row, aligned to a [`FeatureIndex`].
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// One value per index offset.
    Dense(Vec<f64>),
    /// `(offset, value)` pairs sorted by offset, zero values omitted.
    Sparse(Vec<(usize, f64)>),
}

impl Row {
    /// Non-zero `(offset, value)` pairs in ascending offset order.
    pub fn entries(&self) -> Vec<(usize, f64)> {
        match self {
            Row::Dense(values) => values
                .iter()
                .enumerate()
                .filter(|(_, v)| **v != 0.0)
                .map(|(i, v)| (i, *v))
                .collect(),
            Row::Sparse(entries) => entries.clone(),
        }
    }

    /// Expand to a vector of the given width.
    pub fn to_dense(&self, width: usize) -> Vec<f64> {
        match self {
            Row::Dense(values) => {
                let mut values = values.clone();
                values.resize(width, 0.0);
                values
            }
            Row::Sparse(entries) => {
                let mut values = vec![0.0; width];
                for &(offset, value) in entries {
                    if offset < width {
                        values[offset] = value;
                    }
                }
                values
            }
        }
    }
}

/// Instances plus the derived outcome and feature-name sets.
#[derive(Debug, Clone, Default)]
pub struct InstanceTable {
    instances: Vec<Instance>,
    outcomes: BTreeSet<String>,
    feature_names: BTreeSet<String>,
    closed: bool,
}

impl InstanceTable {
    fn record(&mut self, instance: &Instance) {
        self.outcomes.extend(instance.outcomes().iter().cloned());
        for feature in instance.features() {
            if !self.feature_names.contains(feature.name()) {
                self.feature_names.insert(feature.name().to_string());
            }
        }
    }

    fn push(&mut self, instance: Instance) -> Result<()> {
        if self.closed {
            return Err(TcError::StoreClosed);
        }
        check_unique(&instance)?;
        self.record(&instance);
        self.instances.push(instance);
        Ok(())
    }

    fn replace(&mut self, instances: Vec<Instance>) -> Result<()> {
        for instance in &instances {
            check_unique(instance)?;
        }
        self.outcomes.clear();
        self.feature_names.clear();
        for instance in &instances {
            self.record(instance);
        }
        self.instances = instances;
        Ok(())
    }
}

fn check_unique(instance: &Instance) -> Result<()> {
    if instance.has_unique_feature_names() {
        return Ok(());
    }
    let mut seen = AHashSet::new();
    let duplicate = instance
        .features()
        .iter()
        .find(|f| !seen.insert(f.name()))
        .map(|f| f.name().to_string())
        .unwrap_or_default();
    Err(TcError::duplicate_feature(duplicate))
}

/// The collection of instances of one extraction run.
pub trait FeatureStore: fmt::Debug {
    /// The variant of this store.
    fn kind(&self) -> StoreKind;

    /// Shared instance storage.
    fn table(&self) -> &InstanceTable;

    /// Mutable shared instance storage.
    fn table_mut(&mut self) -> &mut InstanceTable;

    /// Materialize the row of instance `i` aligned to `index`.
    ///
    /// Features unknown to the index are skipped, missing features are 0.0.
    fn row(&self, i: usize, index: &FeatureIndex, coercer: &mut ValueCoercer) -> Result<Row>;

    /// Append an instance.
    ///
    /// Fails with [`TcError::DuplicateFeature`] if the instance's feature
    /// names are not unique and with [`TcError::StoreClosed`] after
    /// [`close`](FeatureStore::close).
    fn add_instance(&mut self, instance: Instance) -> Result<()> {
        self.table_mut().push(instance)
    }

    /// Number of instances.
    fn size(&self) -> usize {
        self.table().instances.len()
    }

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Instance by id.
    fn instance(&self, i: usize) -> Option<&Instance> {
        self.table().instances.get(i)
    }

    /// All instances in store order.
    fn instances(&self) -> &[Instance] {
        &self.table().instances
    }

    /// Distinct outcomes across all instances.
    fn unique_outcomes(&self) -> &BTreeSet<String> {
        &self.table().outcomes
    }

    /// Distinct feature names in lexicographic order.
    ///
    /// This is for inspection; encoding uses the first-seen order of a
    /// [`FeatureIndex`].
    fn feature_names(&self) -> Vec<&str> {
        self.table().feature_names.iter().map(String::as_str).collect()
    }

    /// Stop accepting new instances.
    fn close(&mut self) {
        self.table_mut().closed = true;
    }

    fn is_closed(&self) -> bool {
        self.table().closed
    }

    /// Replace the instance set, rebuilding the bookkeeping.
    ///
    /// This is the mutation path used by filters and is allowed on a closed
    /// store.
    fn replace_instances(&mut self, instances: Vec<Instance>) -> Result<()> {
        self.table_mut().replace(instances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::Feature;

    fn instance(features: &[(&str, f64)], outcome: &str) -> Instance {
        let features = features
            .iter()
            .map(|(name, value)| Feature::new(*name, *value).unwrap());
        Instance::new(features, [outcome]).unwrap()
    }

    #[test]
    fn test_bookkeeping() {
        for kind in [StoreKind::Dense, StoreKind::Sparse] {
            let mut store = new_store(kind);
            assert_eq!(store.kind(), kind);
            assert!(store.is_empty());

            store.add_instance(instance(&[("zeta", 1.0), ("alpha", 0.0)], "b")).unwrap();
            store.add_instance(instance(&[("mid", 2.0)], "a")).unwrap();

            assert_eq!(store.size(), 2);
            assert_eq!(store.feature_names(), vec!["alpha", "mid", "zeta"]);
            let outcomes: Vec<&str> = store.unique_outcomes().iter().map(String::as_str).collect();
            assert_eq!(outcomes, vec!["a", "b"]);
            assert_eq!(store.instance(1).unwrap().outcome(), Some("a"));
        }
    }

    #[test]
    fn test_closed_store_rejects_instances() {
        let mut store = SparseFeatureStore::new();
        store.add_instance(instance(&[("a", 1.0)], "x")).unwrap();
        store.close();

        let err = store.add_instance(instance(&[("a", 1.0)], "y")).unwrap_err();
        assert!(matches!(err, TcError::StoreClosed));
        assert_eq!(store.size(), 1);
        assert_eq!(store.unique_outcomes().len(), 1);
    }

    #[test]
    fn test_replace_rebuilds_bookkeeping() {
        let mut store = DenseFeatureStore::new();
        store.add_instance(instance(&[("a", 1.0)], "x")).unwrap();
        store.add_instance(instance(&[("b", 1.0)], "y")).unwrap();
        store.close();

        let kept = vec![store.instance(0).unwrap().clone()];
        store.replace_instances(kept).unwrap();

        assert_eq!(store.size(), 1);
        assert_eq!(store.feature_names(), vec!["a"]);
        assert_eq!(store.unique_outcomes().len(), 1);
    }

    #[test]
    fn test_value_coercer_policies() {
        let nominal = Feature::new("prev", "BOS").unwrap();

        let mut zero = ValueCoercer::new(NominalPolicy::Zero);
        assert_eq!(zero.coerce(&nominal).unwrap(), 0.0);
        assert_eq!(zero.coerce(&nominal).unwrap(), 0.0);
        assert_eq!(zero.degraded_features(), 1);

        let mut reject = ValueCoercer::new(NominalPolicy::Reject);
        assert!(matches!(
            reject.coerce(&nominal),
            Err(TcError::UnsupportedFeatureValue { .. })
        ));
    }

    #[test]
    fn test_row_conversions() {
        let dense = Row::Dense(vec![0.0, 2.0, 0.0, 1.5]);
        assert_eq!(dense.entries(), vec![(1, 2.0), (3, 1.5)]);

        let sparse = Row::Sparse(vec![(1, 2.0), (3, 1.5)]);
        assert_eq!(sparse.to_dense(5), vec![0.0, 2.0, 0.0, 1.5, 0.0]);
    }

    #[test]
    fn test_store_kind_from_str() {
        assert_eq!("Dense".parse::<StoreKind>().unwrap(), StoreKind::Dense);
        assert!("columnar".parse::<StoreKind>().is_err());
    }
}
