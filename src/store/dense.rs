//! Dense feature store.

use crate::error::Result;
use crate::index::FeatureIndex;
use crate::store::{FeatureStore, InstanceTable, Row, StoreKind, ValueCoercer};

/// Feature store that materializes one full-width vector per instance.
///
/// Every row has one slot per index offset; features an instance never
/// produced stay at 0.0.
#[derive(Debug, Clone, Default)]
pub struct DenseFeatureStore {
    table: InstanceTable,
}

impl DenseFeatureStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FeatureStore for DenseFeatureStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Dense
    }

    fn table(&self) -> &InstanceTable {
        &self.table
    }

    fn table_mut(&mut self) -> &mut InstanceTable {
        &mut self.table
    }

    fn row(&self, i: usize, index: &FeatureIndex, coercer: &mut ValueCoercer) -> Result<Row> {
        let mut values = vec![0.0; index.len()];
        if let Some(instance) = self.instance(i) {
            for feature in instance.features().iter().filter(|f| !f.is_default()) {
                if let Some(offset) = index.offset(feature.name()) {
                    values[offset] = coercer.coerce(feature)?;
                }
            }
        }
        Ok(Row::Dense(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::Feature;
    use crate::instance::Instance;
    use crate::store::NominalPolicy;

    #[test]
    fn test_dense_rows_have_full_width() {
        let mut store = DenseFeatureStore::new();
        store
            .add_instance(
                Instance::new(
                    vec![Feature::new("a", 1.0).unwrap(), Feature::new("b", true).unwrap()],
                    ["x"],
                )
                .unwrap(),
            )
            .unwrap();
        store
            .add_instance(Instance::new(vec![Feature::new("c", 0.5).unwrap()], ["y"]).unwrap())
            .unwrap();

        let index = FeatureIndex::build(&store);
        let mut coercer = ValueCoercer::new(NominalPolicy::Zero);

        assert_eq!(
            store.row(0, &index, &mut coercer).unwrap(),
            Row::Dense(vec![1.0, 1.0, 0.0])
        );
        assert_eq!(
            store.row(1, &index, &mut coercer).unwrap(),
            Row::Dense(vec![0.0, 0.0, 0.5])
        );
    }

    #[test]
    fn test_default_features_stay_zero() {
        let mut store = DenseFeatureStore::new();
        store
            .add_instance(
                Instance::new(
                    vec![
                        Feature::with_default_flag("pos", "", true).unwrap(),
                        Feature::new("a", 2.0).unwrap(),
                    ],
                    ["x"],
                )
                .unwrap(),
            )
            .unwrap();

        let index = FeatureIndex::build(&store);
        let mut coercer = ValueCoercer::new(NominalPolicy::Reject);
        assert_eq!(
            store.row(0, &index, &mut coercer).unwrap(),
            Row::Dense(vec![0.0, 2.0])
        );
    }
}
