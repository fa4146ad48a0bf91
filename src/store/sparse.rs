//! Sparse feature store.

use crate::error::Result;
use crate::index::FeatureIndex;
use crate::store::{FeatureStore, InstanceTable, Row, StoreKind, ValueCoercer};

/// Feature store that materializes only the non-default values of a row.
#[derive(Debug, Clone, Default)]
pub struct SparseFeatureStore {
    table: InstanceTable,
}

impl SparseFeatureStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FeatureStore for SparseFeatureStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Sparse
    }

    fn table(&self) -> &InstanceTable {
        &self.table
    }

    fn table_mut(&mut self) -> &mut InstanceTable {
        &mut self.table
    }

    fn row(&self, i: usize, index: &FeatureIndex, coercer: &mut ValueCoercer) -> Result<Row> {
        let mut entries = Vec::new();
        if let Some(instance) = self.instance(i) {
            for feature in instance.features() {
                if feature.is_default() {
                    continue;
                }
                let Some(offset) = index.offset(feature.name()) else {
                    continue;
                };
                let value = coercer.coerce(feature)?;
                if value != 0.0 {
                    entries.push((offset, value));
                }
            }
        }
        entries.sort_by_key(|&(offset, _)| offset);
        Ok(Row::Sparse(entries))
    }
}
