//! Name-keyed extractor factories.

use std::collections::BTreeMap;
use std::fmt;

use crate::config::ExtractorSpec;
use crate::error::{Result, TcError};
use crate::extraction::extractor::parse_params;
use crate::extraction::ngram::{NGRAM, NgramExtractor, NgramParams};
use crate::extraction::style::{
    CHARACTER_COUNT, CharacterCountExtractor, LONG_WORDS_RATIO, LongWordsExtractor,
    LongWordsParams, TOKEN_COUNT, TokenCountExtractor,
};
use crate::extraction::FeatureExtractor;

/// Creates an extractor from its JSON parameters.
pub type ExtractorFactory =
    Box<dyn Fn(&serde_json::Value) -> Result<Box<dyn FeatureExtractor>> + Send + Sync>;

/// Resolves extractor names from a configuration to instances.
pub struct ExtractorRegistry {
    factories: BTreeMap<String, ExtractorFactory>,
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl Default for ExtractorRegistry {
    /// A registry with the built-in extractors.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(TOKEN_COUNT, |_| Ok(Box::new(TokenCountExtractor)));
        registry.register(CHARACTER_COUNT, |_| Ok(Box::new(CharacterCountExtractor)));
        registry.register(LONG_WORDS_RATIO, |params| {
            let params: LongWordsParams = parse_params(LONG_WORDS_RATIO, params)?;
            Ok(Box::new(LongWordsExtractor::new(params)))
        });
        registry.register(NGRAM, |params| {
            let params: NgramParams = parse_params(NGRAM, params)?;
            Ok(Box::new(NgramExtractor::new(params)?))
        });
        registry
    }
}

impl ExtractorRegistry {
    /// A registry without any extractor.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register `factory` under `name`, replacing an earlier registration.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&serde_json::Value) -> Result<Box<dyn FeatureExtractor>> + Send + Sync + 'static,
    {
        if self
            .factories
            .insert(name.to_string(), Box::new(factory))
            .is_some()
        {
            log::debug!("replaced extractor factory '{name}'");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Instantiate one extractor.
    pub fn create(&self, spec: &ExtractorSpec) -> Result<Box<dyn FeatureExtractor>> {
        let factory = self.factories.get(&spec.name).ok_or_else(|| {
            TcError::config(format!(
                "unknown extractor '{}', known extractors: {}",
                spec.name,
                self.names().join(", ")
            ))
        })?;
        factory(&spec.params)
    }

    /// Instantiate a feature set in order.
    pub fn create_all(&self, specs: &[ExtractorSpec]) -> Result<Vec<Box<dyn FeatureExtractor>>> {
        specs.iter().map(|spec| self.create(spec)).collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::extraction::TextUnit;
    use crate::feature::Feature;

    #[derive(Debug)]
    struct Constant;

    impl FeatureExtractor for Constant {
        fn name(&self) -> &str {
            "constant"
        }

        fn extract(&self, _unit: &TextUnit) -> Result<Vec<Feature>> {
            Ok(vec![Feature::new("constant", 1.0)?])
        }
    }

    #[test]
    fn test_default_names() {
        let registry = ExtractorRegistry::default();
        assert_eq!(
            registry.names(),
            vec!["character_count", "long_words_ratio", "ngram", "token_count"]
        );
    }

    #[test]
    fn test_create_with_params() {
        let registry = ExtractorRegistry::default();
        let extractor = registry
            .create(&ExtractorSpec::with_params("ngram", json!({"max_n": 2, "top_k": 10})))
            .unwrap();
        assert_eq!(extractor.name(), "ngram");

        let err = registry
            .create(&ExtractorSpec::with_params("ngram", json!({"max_n": "two"})))
            .unwrap_err();
        assert!(matches!(err, TcError::Anyhow(_)));
    }

    #[test]
    fn test_unknown_extractor() {
        let registry = ExtractorRegistry::default();
        let err = registry.create(&ExtractorSpec::new("sentiment")).unwrap_err();
        assert!(err.to_string().contains("token_count"));
    }

    #[test]
    fn test_register_custom() {
        let mut registry = ExtractorRegistry::empty();
        registry.register("constant", |_| Ok(Box::new(Constant)));
        let extractors = registry.create_all(&[ExtractorSpec::new("constant")]).unwrap();
        assert_eq!(extractors.len(), 1);
    }
}
