use serde::Serialize;

use crate::domain::ClassCode;

/// Confusion counts with REAL as the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_real: usize,
    pub false_real: usize,
    pub true_fake: usize,
    pub false_fake: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Evaluation {
    pub samples: usize,
    pub accuracy: Option<f64>,
    /// REAL is the positive class.
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub confusion: ConfusionMatrix,
}

impl ConfusionMatrix {
    pub fn record(&mut self, actual: ClassCode, predicted: ClassCode) {
        match (actual == ClassCode::REAL, predicted == ClassCode::REAL) {
            (true, true) => self.true_real += 1,
            (false, true) => self.false_real += 1,
            (false, false) => self.true_fake += 1,
            (true, false) => self.false_fake += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_real + self.false_real + self.true_fake + self.false_fake
    }

    pub fn correct(&self) -> usize {
        self.true_real + self.true_fake
    }

    pub fn precision(&self) -> Option<f64> {
        ratio(self.true_real, self.true_real + self.false_real)
    }

    pub fn recall(&self) -> Option<f64> {
        ratio(self.true_real, self.true_real + self.false_fake)
    }
}

impl Evaluation {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (ClassCode, ClassCode)>,
    {
        let mut confusion = ConfusionMatrix::default();
        for (actual, predicted) in pairs {
            confusion.record(actual, predicted);
        }
        Self {
            samples: confusion.total(),
            accuracy: ratio(confusion.correct(), confusion.total()),
            precision: confusion.precision(),
            recall: confusion.recall(),
            confusion,
        }
    }
}

fn ratio(num: usize, den: usize) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}
