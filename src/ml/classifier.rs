use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::ClassifierParams,
    domain::{ClassCode, Label},
};

use super::vectorizer::FeatureVector;

/// Binary L2-regularized logistic regression over count vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classifier {
    weights: Vec<f64>,
    intercept: f64,
    vocabulary_fingerprint: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitSummary {
    pub iterations: usize,
    pub converged: bool,
    pub final_loss: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("feature vector has dimension {actual}, classifier expects {expected}")]
pub struct DimensionMismatch {
    pub expected: usize,
    pub actual: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("no training samples")]
    NoSamples,
    #[error("{features} feature vectors but {targets} targets")]
    LengthMismatch { features: usize, targets: usize },
    #[error("training samples only contain the {label} class")]
    SingleClass { label: Label },
    #[error(transparent)]
    Dimension(#[from] DimensionMismatch),
    #[error("optimization diverged at iteration {iteration}")]
    Diverged { iteration: usize },
}

impl Classifier {
    pub fn fit(
        features: &[FeatureVector],
        targets: &[ClassCode],
        dimension: usize,
        vocabulary_fingerprint: u64,
        params: &ClassifierParams,
    ) -> Result<(Self, FitSummary), FitError> {
        if features.len() != targets.len() {
            return Err(FitError::LengthMismatch {
                features: features.len(),
                targets: targets.len(),
            });
        }
        if features.is_empty() {
            return Err(FitError::NoSamples);
        }
        if let Some(label) = single_class(targets) {
            return Err(FitError::SingleClass { label });
        }
        if let Some(bad) = features.iter().find(|x| x.dimension() != dimension) {
            return Err(DimensionMismatch {
                expected: dimension,
                actual: bad.dimension(),
            }
            .into());
        }

        let n = features.len() as f64;
        let l2 = 1.0 / (params.c * n);
        let mut weights = vec![0.0; dimension];
        let mut intercept = 0.0;
        let mut grad_w = vec![0.0; dimension];
        let mut summary = FitSummary {
            iterations: 0,
            converged: false,
            final_loss: f64::NAN,
        };

        for iteration in 0..params.max_iter {
            grad_w.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_b = 0.0;
            let mut loss = 0.0;

            for (x, y) in features.iter().zip(targets) {
                let y = f64::from(y.value());
                let z = intercept + x.dot(&weights);
                let residual = sigmoid(z) - y;
                grad_b += residual;
                for (index, value) in x.entries() {
                    grad_w[*index] += residual * value;
                }
                loss += softplus(z) - y * z;
            }

            let penalty: f64 = weights.iter().map(|w| w * w).sum::<f64>() * l2 / 2.0;
            loss = loss / n + penalty;
            if !loss.is_finite() {
                return Err(FitError::Diverged { iteration });
            }

            let mut max_grad = (grad_b / n).abs();
            for (g, w) in grad_w.iter_mut().zip(&weights) {
                *g = *g / n + l2 * w;
                max_grad = max_grad.max(g.abs());
            }

            summary.iterations = iteration + 1;
            summary.final_loss = loss;
            if max_grad < params.tolerance {
                summary.converged = true;
                break;
            }

            intercept -= params.learning_rate * grad_b / n;
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= params.learning_rate * g;
            }
        }

        tracing::debug!(
            target: "training",
            iterations = summary.iterations,
            converged = summary.converged,
            loss = summary.final_loss,
            "classifier fitted"
        );

        Ok((
            Self {
                weights,
                intercept,
                vocabulary_fingerprint,
            },
            summary,
        ))
    }

    pub fn dimension(&self) -> usize {
        self.weights.len()
    }

    pub fn vocabulary_fingerprint(&self) -> u64 {
        self.vocabulary_fingerprint
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn decision_function(&self, x: &FeatureVector) -> Result<f64, DimensionMismatch> {
        if x.dimension() != self.dimension() {
            return Err(DimensionMismatch {
                expected: self.dimension(),
                actual: x.dimension(),
            });
        }
        Ok(self.intercept + x.dot(&self.weights))
    }

    pub fn predict_class(&self, x: &FeatureVector) -> Result<ClassCode, DimensionMismatch> {
        let z = self.decision_function(x)?;
        Ok(if z > 0.0 { ClassCode::REAL } else { ClassCode::FAKE })
    }

    /// `[P(FAKE), P(REAL)]`
    pub fn predict_probability(&self, x: &FeatureVector) -> Result<[f64; 2], DimensionMismatch> {
        let p = sigmoid(self.decision_function(x)?);
        Ok([1.0 - p, p])
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        self.intercept.is_finite() && self.weights.iter().all(|w| w.is_finite())
    }
}

fn single_class(targets: &[ClassCode]) -> Option<Label> {
    let first = *targets.first()?;
    targets
        .iter()
        .all(|code| *code == first)
        .then(|| Label::from_code(first))
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

// ln(1 + e^z) without overflow.
fn softplus(z: f64) -> f64 {
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::vectorizer::Vectorizer;

    fn toy() -> (Vectorizer, Vec<FeatureVector>, Vec<ClassCode>) {
        let texts = [
            "shocking miracle cure doctors hate",
            "shocking aliens secret miracle",
            "you won't believe this miracle",
            "senate approves annual budget",
            "central bank holds interest rates",
            "senate committee reviews budget",
        ];
        let targets = vec![
            ClassCode::FAKE,
            ClassCode::FAKE,
            ClassCode::FAKE,
            ClassCode::REAL,
            ClassCode::REAL,
            ClassCode::REAL,
        ];
        let vectorizer = Vectorizer::fit(texts, 100);
        let features = vectorizer.transform(texts);
        (vectorizer, features, targets)
    }

    fn fit(params: &ClassifierParams) -> (Vectorizer, Classifier, FitSummary) {
        let (vectorizer, features, targets) = toy();
        let (classifier, summary) = Classifier::fit(
            &features,
            &targets,
            vectorizer.dimension(),
            vectorizer.fingerprint(),
            params,
        )
        .unwrap();
        (vectorizer, classifier, summary)
    }

    #[test]
    fn separates_training_data() {
        let (vectorizer, classifier, _) = fit(&ClassifierParams::default());
        let fake = vectorizer.transform_one("shocking miracle");
        let real = vectorizer.transform_one("senate budget");
        assert_eq!(classifier.predict_class(&fake).unwrap(), ClassCode::FAKE);
        assert_eq!(classifier.predict_class(&real).unwrap(), ClassCode::REAL);
    }

    #[test]
    fn probabilities_sum_to_one_and_agree_with_class() {
        let (vectorizer, classifier, _) = fit(&ClassifierParams::default());
        let x = vectorizer.transform_one("senate budget rates");
        let [p_fake, p_real] = classifier.predict_probability(&x).unwrap();
        assert!((p_fake + p_real - 1.0).abs() < 1e-12);
        assert_eq!(
            classifier.predict_class(&x).unwrap() == ClassCode::REAL,
            p_real > 0.5
        );
    }

    #[test]
    fn zero_vector_is_decided_by_intercept() {
        let (vectorizer, classifier, _) = fit(&ClassifierParams::default());
        let zero = FeatureVector::zeros(vectorizer.dimension());
        let [p_fake, p_real] = classifier.predict_probability(&zero).unwrap();
        assert_eq!(p_real, sigmoid(classifier.intercept()));
        assert!(p_fake.max(p_real) >= 0.5);
    }

    #[test]
    fn fit_is_deterministic() {
        let (_, a, sa) = fit(&ClassifierParams::default());
        let (_, b, sb) = fit(&ClassifierParams::default());
        assert_eq!(a, b);
        assert_eq!(sa, sb);
    }

    #[test]
    fn stronger_regularization_shrinks_weights() {
        let (_, loose, _) = fit(&ClassifierParams::default());
        let (_, tight, _) = fit(&ClassifierParams {
            c: 0.1,
            ..ClassifierParams::default()
        });
        let norm = |c: &Classifier| c.weights().iter().map(|w| w * w).sum::<f64>();
        assert!(norm(&tight) < norm(&loose));
    }

    #[test]
    fn stops_early_when_gradient_vanishes() {
        let (_, _, summary) = fit(&ClassifierParams {
            tolerance: 1.0,
            ..ClassifierParams::default()
        });
        assert!(summary.converged);
        assert_eq!(summary.iterations, 1);
    }

    #[test]
    fn rejects_dimension_mismatch_at_predict() {
        let (_, classifier, _) = fit(&ClassifierParams::default());
        let err = classifier
            .predict_class(&FeatureVector::zeros(classifier.dimension() + 1))
            .unwrap_err();
        assert_eq!(err.expected, classifier.dimension());
    }

    #[test]
    fn rejects_single_class_targets() {
        let (vectorizer, features, _) = toy();
        let targets = vec![ClassCode::REAL; features.len()];
        let err = Classifier::fit(
            &features,
            &targets,
            vectorizer.dimension(),
            0,
            &ClassifierParams::default(),
        )
        .unwrap_err();
        assert_eq!(err, FitError::SingleClass { label: Label::Real });
    }

    #[test]
    fn rejects_empty_training_set() {
        let err = Classifier::fit(&[], &[], 3, 0, &ClassifierParams::default()).unwrap_err();
        assert_eq!(err, FitError::NoSamples);
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert!((softplus(1000.0) - 1000.0).abs() < 1e-9);
        assert!(softplus(-1000.0) >= 0.0);
    }
}
