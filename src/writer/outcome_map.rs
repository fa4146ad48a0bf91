//! Outcome label to numeric id mapping.
//!
//! Formats whose trainers only accept integer labels (SVM-HMM, numeric
//! LIBLINEAR outcomes) replace each outcome string by an id. Ids are assigned
//! to the lexicographically sorted outcome set starting at 1, and the mapping
//! is persisted next to the training file so predictions can be translated
//! back.

use std::collections::BTreeMap;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::{Result, TcError};
use crate::store::FeatureStore;

/// File name used for persisted outcome mappings.
pub const OUTCOME_MAP_FILE: &str = "outcome-mapping.tsv";

/// Bidirectional outcome label / id mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeMap {
    ids: BTreeMap<String, u32>,
    labels: BTreeMap<u32, String>,
}

impl OutcomeMap {
    /// Map the distinct outcomes of a store to `1..=n`.
    pub fn from_store(store: &dyn FeatureStore) -> Self {
        Self::from_labels(store.unique_outcomes().iter().cloned())
    }

    /// Map labels, in sorted order, to `1..=n`.
    pub fn from_labels<I: IntoIterator<Item = String>>(labels: I) -> Self {
        let mut sorted: Vec<String> = labels.into_iter().collect();
        sorted.sort();
        sorted.dedup();

        let mut map = OutcomeMap::default();
        for (i, label) in sorted.into_iter().enumerate() {
            map.insert(i as u32 + 1, label);
        }
        map
    }

    fn insert(&mut self, id: u32, label: String) {
        self.ids.insert(label.clone(), id);
        self.labels.insert(id, label);
    }

    /// Id of a label.
    pub fn id(&self, label: &str) -> Option<u32> {
        self.ids.get(label).copied()
    }

    /// Id of a label, failing for labels outside the mapping.
    pub fn require_id(&self, label: &str) -> Result<u32> {
        self.id(label)
            .ok_or_else(|| TcError::invalid_outcome(format!("'{label}' is not in the outcome mapping")))
    }

    /// Label of an id.
    pub fn label(&self, id: u32) -> Option<&str> {
        self.labels.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// `(id, label)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.labels.iter().map(|(id, label)| (*id, label.as_str()))
    }

    /// Write `id<TAB>label` rows.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_path(path.as_ref())?;
        for (id, label) in self.iter() {
            writer.write_record([id.to_string().as_str(), label])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a mapping written by [`write_to`](Self::write_to).
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_path(path.as_ref())?;

        let mut map = OutcomeMap::default();
        for record in reader.records() {
            let record = record?;
            if record.len() != 2 {
                return Err(TcError::format(format!(
                    "expected 'id<TAB>label' in {}, got {} fields",
                    path.as_ref().display(),
                    record.len()
                )));
            }
            let id = record[0]
                .parse::<u32>()
                .map_err(|_| TcError::format(format!("invalid outcome id '{}'", &record[0])))?;
            map.insert(id, record[1].to_string());
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_ids_follow_sorted_labels() {
        let map = OutcomeMap::from_labels(["NN", "DT", "VB", "NN"].map(String::from));
        assert_eq!(map.len(), 3);
        assert_eq!(map.id("DT"), Some(1));
        assert_eq!(map.id("NN"), Some(2));
        assert_eq!(map.id("VB"), Some(3));
        assert_eq!(map.label(3), Some("VB"));
        assert!(map.require_id("JJ").is_err());
    }

    #[test]
    fn test_persisted_mapping() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(OUTCOME_MAP_FILE);

        let map = OutcomeMap::from_labels(["neg", "pos", "needs review"].map(String::from));
        map.write_to(&path).unwrap();

        assert_eq!(OutcomeMap::read_from(&path).unwrap(), map);
    }
}
