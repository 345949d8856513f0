use std::sync::Arc;

use thiserror::Error;

use crate::{
    domain::{label, prediction::confidence_percent, PredictionResult},
    ml::{Classifier, Vectorizer},
};

use super::state::{ServiceUnavailableError, ServingState};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PredictionError {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Unavailable(#[from] ServiceUnavailableError),
    #[error(transparent)]
    Failed(#[from] PredictionError),
}

#[derive(Clone)]
pub struct Predictor {
    state: Arc<ServingState>,
}

impl Predictor {
    pub fn new(state: Arc<ServingState>) -> Self {
        Self { state }
    }

    pub fn predict(&self, text: &str) -> Result<PredictionResult, PredictError> {
        let snapshot = self.state.snapshot();
        let (vectorizer, classifier) = snapshot.model()?;
        let result = score(vectorizer, classifier, text)?;
        tracing::debug!(
            target: "serving",
            prediction = %result.prediction,
            probability = result.probability,
            chars = text.chars().count(),
            "claim scored"
        );
        Ok(result)
    }
}

pub fn score(
    vectorizer: &Vectorizer,
    classifier: &Classifier,
    text: &str,
) -> Result<PredictionResult, PredictionError> {
    let vector = vectorizer.transform_one(text);
    let code = classifier.predict_class(&vector).map_err(failed)?;
    let probabilities = classifier.predict_probability(&vector).map_err(failed)?;
    if probabilities.iter().any(|p| !p.is_finite()) {
        return Err(PredictionError {
            message: format!("classifier produced non-finite probabilities {probabilities:?}"),
        });
    }
    Ok(PredictionResult {
        prediction: label::decode(code),
        probability: confidence_percent(probabilities),
    })
}

fn failed(err: impl std::fmt::Display) -> PredictionError {
    PredictionError {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ClassifierParams,
        domain::{ClassCode, Label},
        ml::ModelPair,
        serving::state::ServingSnapshot,
        store::ArtifactStore,
    };

    fn pair() -> ModelPair {
        let texts = [
            "shocking miracle cure revealed",
            "aliens secretly control shocking miracle",
            "senate approves budget",
            "bank holds interest rates steady",
        ];
        let vectorizer = Vectorizer::fit(texts, 50);
        let features = vectorizer.transform(texts);
        let (classifier, _) = Classifier::fit(
            &features,
            &[ClassCode::FAKE, ClassCode::FAKE, ClassCode::REAL, ClassCode::REAL],
            vectorizer.dimension(),
            vectorizer.fingerprint(),
            &ClassifierParams::default(),
        )
        .unwrap();
        ModelPair::new(vectorizer, classifier).unwrap()
    }

    fn predictor(snapshot: ServingSnapshot) -> Predictor {
        let store = ArtifactStore::new("unused");
        Predictor::new(Arc::new(ServingState::with_snapshot(store, snapshot)))
    }

    #[test]
    fn predicts_label_and_confidence() {
        let predictor = predictor(ServingSnapshot::ready(pair()));
        let result = predictor.predict("shocking miracle").unwrap();
        assert_eq!(result.prediction, Label::Fake);
        assert!(result.probability > 50.0 && result.probability <= 100.0);
    }

    #[test]
    fn empty_text_still_predicts() {
        let predictor = predictor(ServingSnapshot::ready(pair()));
        let first = predictor.predict("").unwrap();
        let second = predictor.predict("").unwrap();
        assert_eq!(first, second);
        assert!((50.0..=100.0).contains(&first.probability));
    }

    #[test]
    fn confidence_has_two_decimals() {
        let predictor = predictor(ServingSnapshot::ready(pair()));
        let result = predictor.predict("senate budget rates").unwrap();
        let scaled = result.probability * 100.0;
        assert!((scaled - scaled.round()).abs() < 1e-6);
    }

    #[test]
    fn absent_state_is_unavailable() {
        let predictor = predictor(ServingSnapshot::empty());
        let err = predictor.predict("anything").unwrap_err();
        assert!(matches!(err, PredictError::Unavailable(_)));
        assert_eq!(err.to_string(), "model or vectorizer not found");
    }

    #[test]
    fn score_reports_dimension_problems_as_prediction_errors() {
        let (vectorizer, _) = pair().into_parts();
        let texts = ["aa bb", "cc dd"];
        let narrow = Vectorizer::fit(texts, 50);
        let (classifier, _) = Classifier::fit(
            &narrow.transform(texts),
            &[ClassCode::FAKE, ClassCode::REAL],
            narrow.dimension(),
            narrow.fingerprint(),
            &ClassifierParams::default(),
        )
        .unwrap();

        assert_ne!(vectorizer.dimension(), classifier.dimension());
        let err = score(&vectorizer, &classifier, "shocking news").unwrap_err();
        assert!(err.message.contains("dimension"), "{}", err.message);
    }
}
