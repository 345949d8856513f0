use std::collections::{BTreeMap, HashMap};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::tokenizer::tokenize;

/// Sparse view of a fixed-width count vector. Entries are sorted by index and
/// never hold zeros, so the all-zero vector has no entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector {
    dimension: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    pub fn zeros(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |(i, _)| *i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.entries
            .iter()
            .map(|(index, value)| weights[*index] * value)
            .sum()
    }
}

/// Bag-of-words count vectorizer over a bounded vocabulary.
///
/// The only way to obtain one is [`Vectorizer::fit`] or deserializing a
/// fitted artifact, so `transform` always runs against a learned vocabulary.
/// Position in `vocabulary` is the feature index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vectorizer {
    vocabulary: IndexSet<String>,
    max_features: usize,
}

impl Vectorizer {
    pub fn fit<'a, I>(texts: I, max_features: usize) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut frequencies: HashMap<String, u64> = HashMap::new();
        let mut documents = 0usize;
        for text in texts {
            documents += 1;
            for token in tokenize(text) {
                *frequencies.entry(token).or_default() += 1;
            }
        }

        let mut ranked: Vec<(String, u64)> = frequencies.into_iter().collect();
        ranked.sort_unstable_by(|(ta, ca), (tb, cb)| cb.cmp(ca).then_with(|| ta.cmp(tb)));
        ranked.truncate(max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort_unstable();

        let vectorizer = Self {
            vocabulary: terms.into_iter().collect(),
            max_features,
        };
        tracing::debug!(
            target: "training",
            documents,
            vocabulary = vectorizer.dimension(),
            max_features,
            "vectorizer fitted"
        );
        vectorizer
    }

    pub fn transform_one(&self, text: &str) -> FeatureVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokenize(text) {
            if let Some(index) = self.vocabulary.get_index_of(token.as_str()) {
                *counts.entry(index).or_default() += 1.0;
            }
        }
        FeatureVector {
            dimension: self.dimension(),
            entries: counts.into_iter().collect(),
        }
    }

    pub fn transform<'a, I>(&self, texts: I) -> Vec<FeatureVector>
    where
        I: IntoIterator<Item = &'a str>,
    {
        texts
            .into_iter()
            .map(|text| self.transform_one(text))
            .collect()
    }

    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get_index_of(term)
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.iter().map(String::as_str)
    }

    /// FNV-1a over the ordered vocabulary. Two vectorizers agree on every
    /// feature index iff their fingerprints and dimensions agree.
    pub fn fingerprint(&self) -> u64 {
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;

        let mut hash = OFFSET;
        let mut feed = |bytes: &[u8]| {
            for byte in bytes {
                hash ^= u64::from(*byte);
                hash = hash.wrapping_mul(PRIME);
            }
        };
        feed(&(self.dimension() as u64).to_le_bytes());
        for term in &self.vocabulary {
            feed(term.as_bytes());
            feed(&[0xff]);
        }
        hash
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        self.vocabulary.len() <= self.max_features
    }
}

impl PartialEq for Vectorizer {
    fn eq(&self, other: &Self) -> bool {
        self.max_features == other.max_features && self.vocabulary.iter().eq(other.vocabulary.iter())
    }
}
