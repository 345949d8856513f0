pub mod predictor;
pub mod state;

pub use predictor::{PredictError, PredictionError, Predictor};
pub use state::{
    ArtifactStatus, ReloadError, ServiceUnavailableError, ServingSnapshot, ServingState,
    ServingStatus,
};
