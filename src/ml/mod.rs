pub mod classifier;
pub mod metrics;
pub mod pair;
pub mod tokenizer;
pub mod vectorizer;

pub use classifier::{Classifier, DimensionMismatch, FitError, FitSummary};
pub use metrics::{ConfusionMatrix, Evaluation};
pub use pair::{check_pair, ModelPair, PairMismatch};
pub use vectorizer::{FeatureVector, Vectorizer};
