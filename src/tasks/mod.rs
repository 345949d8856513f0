pub mod pipeline;
pub mod training;

pub use pipeline::{fit_pipeline, train_and_persist, TrainError, TrainingReport};
pub use training::TrainingCoordinator;
