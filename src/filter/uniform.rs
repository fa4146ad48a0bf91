//! Uniform class distribution filter.
//!
//! Instances are grouped by their primary outcome. With
//! [`SamplingStrategy::Oversample`] every minority group is topped up with
//! duplicates drawn with replacement until it reaches the size of the largest
//! group; the store ends up with `num_classes * max_count` instances and
//! every original instance survives. With [`SamplingStrategy::Undersample`]
//! each group is cut down to a random subset of the size of the smallest
//! group, leaving `num_classes * min_count` instances. Instances without an
//! outcome are never sampled and never removed.
//!
//! Sampling uses a seeded [`StdRng`], so a given seed and store always
//! produce the same result.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::error::Result;
use crate::filter::FeatureStoreFilter;
use crate::instance::Instance;
use crate::store::FeatureStore;

pub const OVERSAMPLE_NAME: &str = "uniform_class_distribution";
pub const UNDERSAMPLE_NAME: &str = "uniform_class_distribution_undersample";

/// How groups are equalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingStrategy {
    /// Duplicate minority instances up to the majority count.
    #[default]
    Oversample,
    /// Drop majority instances down to the minority count.
    Undersample,
}

/// Equalizes the number of instances per outcome.
#[derive(Debug, Clone)]
pub struct UniformClassDistributionFilter {
    strategy: SamplingStrategy,
    seed: u64,
}

impl UniformClassDistributionFilter {
    pub fn new(seed: u64) -> Self {
        Self {
            strategy: SamplingStrategy::default(),
            seed,
        }
    }

    pub fn with_strategy(mut self, strategy: SamplingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> SamplingStrategy {
        self.strategy
    }

    /// Instance ids grouped by primary outcome, in store order.
    fn group_by_outcome(instances: &[Instance]) -> BTreeMap<&str, Vec<usize>> {
        let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, instance) in instances.iter().enumerate() {
            if let Some(outcome) = instance.outcome() {
                groups.entry(outcome).or_default().push(i);
            }
        }
        groups
    }
}

impl FeatureStoreFilter for UniformClassDistributionFilter {
    fn apply(&self, store: &mut dyn FeatureStore) -> Result<()> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let instances = store.instances();
        let groups = Self::group_by_outcome(instances);
        if groups.len() < 2 {
            return Ok(());
        }

        let selected: Vec<usize> = match self.strategy {
            SamplingStrategy::Oversample => {
                let max = groups.values().map(Vec::len).max().unwrap_or(0);
                let mut selected: Vec<usize> = (0..instances.len()).collect();
                for ids in groups.values() {
                    for _ in ids.len()..max {
                        if let Some(&id) = ids.choose(&mut rng) {
                            selected.push(id);
                        }
                    }
                }
                selected
            }
            SamplingStrategy::Undersample => {
                let min = groups.values().map(Vec::len).min().unwrap_or(0);
                // instances without an outcome belong to no group and are kept
                let mut selected: Vec<usize> = (0..instances.len())
                    .filter(|&i| instances[i].outcome().is_none())
                    .collect();
                for ids in groups.values() {
                    let mut ids = ids.clone();
                    ids.shuffle(&mut rng);
                    ids.truncate(min);
                    ids.sort_unstable();
                    selected.extend(ids);
                }
                selected.sort_unstable();
                selected
            }
        };

        let rebalanced: Vec<Instance> = selected.iter().map(|&i| instances[i].clone()).collect();
        log::debug!(
            "rebalanced {} outcomes: {} -> {} instances",
            groups.len(),
            instances.len(),
            rebalanced.len()
        );
        store.replace_instances(rebalanced)
    }

    fn name(&self) -> &'static str {
        match self.strategy {
            SamplingStrategy::Oversample => OVERSAMPLE_NAME,
            SamplingStrategy::Undersample => UNDERSAMPLE_NAME,
        }
    }
}
