//! Feature name to offset mapping.
//!
//! Offsets are assigned in first-occurrence order: instances are scanned in
//! store order and the features of each instance in insertion order. The same
//! logic serves two-pass encoders ([`FeatureIndex::build`] over a complete
//! store) and one-pass encoders ([`FeatureIndex::observe`] while streaming);
//! for the same input order both yield identical offsets.
//!
//! An index built on a training store can be written to a feature-names file
//! and read back to encode a test store in the same coordinate space.
//! Features the training index does not know are then dropped.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TcError};
use crate::instance::Instance;
use crate::store::FeatureStore;

/// File name used for persisted feature names.
pub const FEATURE_NAMES_FILE: &str = "feature-names.txt";

/// Stable mapping from feature name to a zero-based offset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureIndex {
    names: Vec<String>,
    offsets: AHashMap<String, usize>,
}

impl From<Vec<String>> for FeatureIndex {
    fn from(names: Vec<String>) -> Self {
        let mut index = FeatureIndex::new();
        for name in names {
            index.insert(&name);
        }
        index
    }
}

impl From<FeatureIndex> for Vec<String> {
    fn from(index: FeatureIndex) -> Self {
        index.names
    }
}

impl FeatureIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index over a complete store.
    pub fn build(store: &dyn FeatureStore) -> Self {
        let mut index = FeatureIndex::new();
        for instance in store.instances() {
            index.observe(instance);
        }
        log::debug!(
            "built feature index with {} names over {} instances",
            index.len(),
            store.size()
        );
        index
    }

    /// Extend the index with the features of one instance.
    ///
    /// Returns the number of names that were new.
    pub fn observe(&mut self, instance: &Instance) -> usize {
        instance
            .features()
            .iter()
            .filter(|feature| self.insert(feature.name()))
            .count()
    }

    /// Insert a name if it is unknown. Returns `true` if it was added.
    fn insert(&mut self, name: &str) -> bool {
        if self.offsets.contains_key(name) {
            return false;
        }
        self.offsets.insert(name.to_string(), self.names.len());
        self.names.push(name.to_string());
        true
    }

    /// Offset of a feature name.
    pub fn offset(&self, name: &str) -> Option<usize> {
        self.offsets.get(name).copied()
    }

    /// Feature name at an offset.
    pub fn name(&self, offset: usize) -> Option<&str> {
        self.names.get(offset).map(String::as_str)
    }

    /// Names in offset order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate `(name, offset)` pairs in offset order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.names.iter().enumerate().map(|(i, n)| (n.as_str(), i))
    }

    /// Number of feature occurrences in `store` the index does not cover.
    pub fn count_unknown(&self, store: &dyn FeatureStore) -> usize {
        store
            .instances()
            .iter()
            .flat_map(|instance| instance.features())
            .filter(|feature| !self.offsets.contains_key(feature.name()))
            .count()
    }

    /// Write one name per line, in offset order.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        for name in &self.names {
            if name.contains('\n') || name.contains('\r') {
                return Err(TcError::invalid_feature_name(format!(
                    "line break in feature name {name:?}"
                )));
            }
            writeln!(writer, "{name}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a feature-names file written by [`write_to`](Self::write_to).
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let mut index = FeatureIndex::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            if !index.insert(&line) {
                return Err(TcError::format(format!(
                    "duplicate feature name '{}' on line {} of {}",
                    line,
                    line_num + 1,
                    path.as_ref().display()
                )));
            }
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::feature::Feature;
    use crate::store::SparseFeatureStore;

    fn store() -> SparseFeatureStore {
        let mut store = SparseFeatureStore::new();
        let rows: [(&[&str], &str); 3] = [(&["c", "a"], "x"), (&["a", "d", "b"], "y"), (&["b"], "x")];
        for (names, outcome) in rows {
            let features = names.iter().map(|n| Feature::new(*n, 1.0).unwrap());
            store.add_instance(Instance::new(features, [outcome]).unwrap()).unwrap();
        }
        store
    }

    #[test]
    fn test_first_seen_order() {
        let index = FeatureIndex::build(&store());
        assert_eq!(index.names(), &["c", "a", "d", "b"]);
        assert_eq!(index.offset("c"), Some(0));
        assert_eq!(index.offset("b"), Some(3));
        assert_eq!(index.name(2), Some("d"));
        assert_eq!(index.offset("missing"), None);
    }

    #[test]
    fn test_bijection() {
        let store = store();
        let index = FeatureIndex::build(&store);
        assert_eq!(index.len(), store.feature_names().len());

        let mut offsets: Vec<usize> = index.iter().map(|(_, o)| o).collect();
        offsets.sort_unstable();
        assert_eq!(offsets, (0..index.len()).collect::<Vec<_>>());

        for (name, offset) in index.iter() {
            assert_eq!(index.offset(name), Some(offset));
        }
    }

    #[test]
    fn test_build_is_idempotent() {
        let store = store();
        assert_eq!(FeatureIndex::build(&store), FeatureIndex::build(&store));
    }

    #[test]
    fn test_streaming_matches_build() {
        let store = store();
        let mut streamed = FeatureIndex::new();
        let added: Vec<usize> = store.instances().iter().map(|i| streamed.observe(i)).collect();

        assert_eq!(added, vec![2, 2, 0]);
        assert_eq!(streamed, FeatureIndex::build(&store));
    }

    #[test]
    fn test_feature_names_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(FEATURE_NAMES_FILE);

        let index = FeatureIndex::build(&store());
        index.write_to(&path).unwrap();
        let loaded = FeatureIndex::read_from(&path).unwrap();

        assert_eq!(loaded, index);
    }

    #[test]
    fn test_count_unknown() {
        let train = FeatureIndex::from(vec!["a".to_string(), "b".to_string()]);
        // test store uses c and d twice in total, unknown to training
        assert_eq!(train.count_unknown(&store()), 2);
    }
}
