pub mod example;
pub mod label;
pub mod prediction;

pub use example::{Dataset, LabeledExample};
pub use label::{ClassCode, Label, UnknownLabelError};
pub use prediction::PredictionResult;
