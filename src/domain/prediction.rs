use serde::{Deserialize, Serialize};

use super::label::Label;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: Label,
    /// Top-class probability as a percentage, rounded to two decimals.
    pub probability: f64,
}

pub fn confidence_percent(probabilities: [f64; 2]) -> f64 {
    let top = probabilities[0].max(probabilities[1]);
    (top * 100.0 * 100.0).round() / 100.0
}
