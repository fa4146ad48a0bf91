//! Word n-gram extractor.
//!
//! During [`fit`](FeatureExtractor::fit) the extractor counts, over all
//! training units, the n-grams of every length in `min_n..=max_n`. N-grams
//! whose relative frequency is below `min_frequency` are discarded; of the
//! rest the `top_k` most frequent (ties broken alphabetically) form the
//! vocabulary.
//!
//! Extraction emits one feature per vocabulary entry, `1.0` if the unit
//! contains the n-gram and a default-flagged `0.0` otherwise, so train and
//! test units share the same feature space.

use std::collections::BTreeSet;

use ahash::AHashMap;
use serde::Deserialize;

use crate::error::{Result, TcError};
use crate::extraction::tokenize::{ngrams, tokenize, words};
use crate::extraction::{FeatureExtractor, TextUnit};
use crate::feature::Feature;

pub const NGRAM: &str = "ngram";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NgramParams {
    pub min_n: usize,
    pub max_n: usize,
    /// Vocabulary size limit.
    pub top_k: usize,
    /// Minimum share of all counted n-grams of the same length.
    pub min_frequency: f64,
    pub lowercase: bool,
    /// Drop punctuation tokens before building n-grams.
    pub words_only: bool,
    /// Prefix of the emitted feature names.
    pub prefix: String,
}

impl Default for NgramParams {
    fn default() -> Self {
        Self {
            min_n: 1,
            max_n: 3,
            top_k: 500,
            min_frequency: 0.0,
            lowercase: true,
            words_only: false,
            prefix: NGRAM.to_string(),
        }
    }
}

/// Top-K word n-gram presence features.
#[derive(Debug, Clone)]
pub struct NgramExtractor {
    params: NgramParams,
    vocabulary: BTreeSet<String>,
}

impl NgramExtractor {
    pub fn new(params: NgramParams) -> Result<Self> {
        if params.min_n == 0 || params.min_n > params.max_n {
            return Err(TcError::config(format!(
                "ngram: need 1 <= min_n <= max_n, got {}..{}",
                params.min_n, params.max_n
            )));
        }
        Ok(Self {
            params,
            vocabulary: BTreeSet::new(),
        })
    }

    /// The n-grams selected during fitting.
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.iter().map(String::as_str)
    }

    /// `(n, ngram)` pairs of a text for every configured length.
    fn unit_ngrams(&self, text: &str) -> Vec<(usize, String)> {
        let text = if self.params.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let tokens = if self.params.words_only {
            words(&text)
        } else {
            tokenize(&text)
        };
        (self.params.min_n..=self.params.max_n)
            .flat_map(|n| ngrams(&tokens, n).into_iter().map(move |ngram| (n, ngram)))
            .collect()
    }

    fn feature_name(&self, ngram: &str) -> String {
        format!("{}_{}", self.params.prefix, ngram)
    }
}

impl FeatureExtractor for NgramExtractor {
    fn name(&self) -> &str {
        NGRAM
    }

    fn fit(&mut self, units: &[TextUnit]) -> Result<()> {
        // ngram -> (n, count)
        let mut counts: AHashMap<String, (usize, usize)> = AHashMap::new();
        let mut totals: AHashMap<usize, usize> = AHashMap::new();
        for unit in units {
            for (n, ngram) in self.unit_ngrams(&unit.text) {
                *totals.entry(n).or_insert(0) += 1;
                counts.entry(ngram).or_insert((n, 0)).1 += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = counts
            .into_iter()
            .filter(|(_, (n, count))| {
                let total = totals.get(n).copied().unwrap_or(1);
                *count as f64 / total as f64 >= self.params.min_frequency
            })
            .map(|(ngram, (_, count))| (ngram, count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.params.top_k);

        self.vocabulary = ranked.into_iter().map(|(ngram, _)| ngram).collect();
        log::debug!(
            "ngram vocabulary: {} entries from {} units",
            self.vocabulary.len(),
            units.len()
        );
        Ok(())
    }

    fn extract(&self, unit: &TextUnit) -> Result<Vec<Feature>> {
        let present: BTreeSet<String> = self
            .unit_ngrams(&unit.text)
            .into_iter()
            .map(|(_, ngram)| ngram)
            .collect();
        self.vocabulary
            .iter()
            .map(|ngram| {
                let name = self.feature_name(ngram);
                if present.contains(ngram) {
                    Feature::new(name, 1.0)
                } else {
                    Feature::with_default_flag(name, 0.0, true)
                }
            })
            .collect()
    }
}
