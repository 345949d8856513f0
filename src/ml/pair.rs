use thiserror::Error;

use super::{classifier::Classifier, vectorizer::Vectorizer};

/// A vectorizer and the classifier fitted on its feature space.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPair {
    vectorizer: Vectorizer,
    classifier: Classifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PairMismatch {
    #[error("vectorizer has {vectorizer} features, classifier has {classifier} weights")]
    Dimension { vectorizer: usize, classifier: usize },
    #[error("classifier was fitted on vocabulary {classifier:016x}, vectorizer is {vectorizer:016x}")]
    Fingerprint { vectorizer: u64, classifier: u64 },
}

impl ModelPair {
    pub fn new(vectorizer: Vectorizer, classifier: Classifier) -> Result<Self, PairMismatch> {
        check_pair(&vectorizer, &classifier)?;
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    pub fn vectorizer(&self) -> &Vectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn into_parts(self) -> (Vectorizer, Classifier) {
        (self.vectorizer, self.classifier)
    }
}

pub fn check_pair(vectorizer: &Vectorizer, classifier: &Classifier) -> Result<(), PairMismatch> {
    if vectorizer.dimension() != classifier.dimension() {
        return Err(PairMismatch::Dimension {
            vectorizer: vectorizer.dimension(),
            classifier: classifier.dimension(),
        });
    }
    if vectorizer.fingerprint() != classifier.vocabulary_fingerprint() {
        return Err(PairMismatch::Fingerprint {
            vectorizer: vectorizer.fingerprint(),
            classifier: classifier.vocabulary_fingerprint(),
        });
    }
    Ok(())
}
