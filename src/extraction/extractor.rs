//! The feature extractor capability.

use std::fmt::Debug;

use anyhow::Context;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::extraction::TextUnit;
use crate::feature::Feature;

/// Produces features for a text unit.
///
/// Extractors that depend on corpus statistics (such as n-gram vocabularies)
/// collect them in [`fit`](FeatureExtractor::fit), which runs once over the
/// training units before any extraction.
///
/// # Examples
///
/// ```
/// use tcstore::error::Result;
/// use tcstore::extraction::{FeatureExtractor, TextUnit};
/// use tcstore::feature::Feature;
///
/// #[derive(Debug)]
/// struct QuestionMark;
///
/// impl FeatureExtractor for QuestionMark {
///     fn name(&self) -> &str {
///         "question_mark"
///     }
///
///     fn extract(&self, unit: &TextUnit) -> Result<Vec<Feature>> {
///         Ok(vec![Feature::new("has_question_mark", unit.text.contains('?'))?])
///     }
/// }
///
/// let features = QuestionMark.extract(&TextUnit::new("1", "Why?")).unwrap();
/// assert_eq!(features[0].name(), "has_question_mark");
/// ```
pub trait FeatureExtractor: Debug {
    /// Name of the extractor, used in error messages and logs.
    fn name(&self) -> &str;

    /// Collect corpus statistics over the training units.
    fn fit(&mut self, _units: &[TextUnit]) -> Result<()> {
        Ok(())
    }

    /// Features of one unit.
    fn extract(&self, unit: &TextUnit) -> Result<Vec<Feature>>;
}

/// Deserialize extractor parameters, falling back to defaults for `null`.
pub fn parse_params<P>(extractor: &str, params: &serde_json::Value) -> Result<P>
where
    P: DeserializeOwned + Default,
{
    if params.is_null() {
        return Ok(P::default());
    }
    let parsed = serde_json::from_value(params.clone())
        .with_context(|| format!("invalid parameters for extractor '{extractor}': {params}"))?;
    Ok(parsed)
}
