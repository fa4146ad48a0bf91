//! Surface and style extractors.

use serde::Deserialize;

use crate::error::Result;
use crate::extraction::tokenize::tokenize;
use crate::extraction::{FeatureExtractor, TextUnit};
use crate::feature::Feature;

pub const TOKEN_COUNT: &str = "token_count";
pub const CHARACTER_COUNT: &str = "character_count";
pub const LONG_WORDS_RATIO: &str = "long_words_ratio";

pub const LONG_TOKEN_RATIO: &str = "long_token_ratio";
pub const SHORT_TOKEN_RATIO: &str = "short_token_ratio";

/// Number of tokens (words and punctuation).
#[derive(Debug, Clone, Default)]
pub struct TokenCountExtractor;

impl FeatureExtractor for TokenCountExtractor {
    fn name(&self) -> &str {
        TOKEN_COUNT
    }

    fn extract(&self, unit: &TextUnit) -> Result<Vec<Feature>> {
        Ok(vec![Feature::new(TOKEN_COUNT, tokenize(&unit.text).len())?])
    }
}

/// Number of characters.
#[derive(Debug, Clone, Default)]
pub struct CharacterCountExtractor;

impl FeatureExtractor for CharacterCountExtractor {
    fn name(&self) -> &str {
        CHARACTER_COUNT
    }

    fn extract(&self, unit: &TextUnit) -> Result<Vec<Feature>> {
        Ok(vec![Feature::new(CHARACTER_COUNT, unit.text.chars().count())?])
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LongWordsParams {
    /// Tokens with at least this many characters are long.
    pub min_long_length: usize,
    /// Tokens with at most this many characters are short.
    pub max_short_length: usize,
}

impl Default for LongWordsParams {
    fn default() -> Self {
        Self {
            min_long_length: 7,
            max_short_length: 2,
        }
    }
}

/// Ratios of long and short tokens to all tokens.
#[derive(Debug, Clone, Default)]
pub struct LongWordsExtractor {
    params: LongWordsParams,
}

impl LongWordsExtractor {
    pub fn new(params: LongWordsParams) -> Self {
        Self { params }
    }
}

impl FeatureExtractor for LongWordsExtractor {
    fn name(&self) -> &str {
        LONG_WORDS_RATIO
    }

    fn extract(&self, unit: &TextUnit) -> Result<Vec<Feature>> {
        let tokens = tokenize(&unit.text);
        let (long, short) = tokens.iter().fold((0usize, 0usize), |(long, short), token| {
            let len = token.chars().count();
            (
                long + usize::from(len >= self.params.min_long_length),
                short + usize::from(len <= self.params.max_short_length),
            )
        });
        let ratio = |count: usize| {
            if tokens.is_empty() {
                0.0
            } else {
                count as f64 / tokens.len() as f64
            }
        };

        Ok(vec![
            Feature::new(LONG_TOKEN_RATIO, ratio(long))?,
            Feature::new(SHORT_TOKEN_RATIO, ratio(short))?,
        ])
    }
}
