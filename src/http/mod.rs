use std::sync::Arc;

use axum::{routing::get, Router};

use crate::{
    serving::{Predictor, ServingState},
    tasks::TrainingCoordinator,
};

pub mod handlers;

pub struct AppState {
    pub serving: Arc<ServingState>,
    pub predictor: Predictor,
    pub trainer: Arc<TrainingCoordinator>,
}

impl AppState {
    pub fn new(serving: Arc<ServingState>, trainer: Arc<TrainingCoordinator>) -> Self {
        Self {
            predictor: Predictor::new(serving.clone()),
            serving,
            trainer,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::liveness))
        .route("/status", get(handlers::status))
        .route("/train", get(handlers::train))
        .route("/predict/:claim", get(handlers::predict))
        .with_state(state)
}
