//! Assembling instances from text units.

use crate::config::{ExperimentConfig, FeatureMode};
use crate::error::{Result, TcError};
use crate::extraction::{ExtractorRegistry, FeatureExtractor, TextUnit};
use crate::instance::Instance;
use crate::store::FeatureStore;

/// Runs a feature set over text units and fills a store.
#[derive(Debug)]
pub struct ExtractionRun {
    extractors: Vec<Box<dyn FeatureExtractor>>,
    feature_mode: FeatureMode,
    apply_weighting: bool,
    fitted: bool,
}

impl ExtractionRun {
    pub fn new(extractors: Vec<Box<dyn FeatureExtractor>>) -> Self {
        Self {
            extractors,
            feature_mode: FeatureMode::default(),
            apply_weighting: false,
            fitted: false,
        }
    }

    /// Instantiate the feature set of `config` through `registry`.
    pub fn from_config(config: &ExperimentConfig, registry: &ExtractorRegistry) -> Result<Self> {
        let extractors = registry.create_all(&config.feature_set)?;
        if extractors.is_empty() {
            return Err(TcError::config("the feature set is empty"));
        }
        Ok(Self::new(extractors)
            .with_feature_mode(config.feature_mode)
            .with_weighting(config.apply_weighting))
    }

    pub fn with_feature_mode(mut self, feature_mode: FeatureMode) -> Self {
        self.feature_mode = feature_mode;
        self
    }

    pub fn with_weighting(mut self, apply_weighting: bool) -> Self {
        self.apply_weighting = apply_weighting;
        self
    }

    pub fn extractors(&self) -> &[Box<dyn FeatureExtractor>] {
        &self.extractors
    }

    /// Let every extractor collect its statistics over the training units.
    pub fn fit(&mut self, units: &[TextUnit]) -> Result<()> {
        for extractor in &mut self.extractors {
            extractor.fit(units)?;
            log::debug!("fitted extractor {} on {} units", extractor.name(), units.len());
        }
        self.fitted = true;
        Ok(())
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Build the instance of one unit.
    ///
    /// Fails with [`TcError::DuplicateFeature`] naming the extractor if it
    /// emits a feature name another extractor already produced.
    pub fn extract_instance(&self, unit: &TextUnit) -> Result<Instance> {
        let mut instance = Instance::new(Vec::new(), unit.outcomes.iter().cloned())?;
        for extractor in &self.extractors {
            let features = extractor.extract(unit)?;
            instance.add_features(features).map_err(|e| match e {
                TcError::DuplicateFeature(name) => TcError::duplicate_feature(format!(
                    "{name} (emitted by extractor '{}' for unit '{}')",
                    extractor.name(),
                    unit.id
                )),
                other => other,
            })?;
        }

        if self.apply_weighting {
            instance.set_weight(unit.weight);
        }
        if self.feature_mode == FeatureMode::Sequence {
            if unit.sequence_id == 0 {
                return Err(TcError::invalid_argument(format!(
                    "unit '{}' has no sequence id, but the feature mode is 'sequence'",
                    unit.id
                )));
            }
            instance.set_sequence(unit.sequence_id, unit.sequence_position);
        }
        Ok(instance)
    }

    /// Extract every unit into `store`. Fits first if [`fit`](Self::fit) was
    /// not called. Returns the number of added instances.
    pub fn run(&mut self, units: &[TextUnit], store: &mut dyn FeatureStore) -> Result<usize> {
        if !self.fitted {
            self.fit(units)?;
        }
        for unit in units {
            store.add_instance(self.extract_instance(unit)?)?;
        }
        log::info!(
            "extracted {} instances with {} extractors",
            units.len(),
            self.extractors.len()
        );
        Ok(units.len())
    }
}
