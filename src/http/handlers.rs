use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{serving::PredictError, tasks::TrainError};

use super::AppState;

pub const LIVENESS_MESSAGE: &str = "We are live";
pub const TRAINED_MESSAGE: &str = "Model trained and saved successfully";

pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

pub async fn status(State(state): State<Arc<AppState>>) -> Response {
    Json(state.serving.status()).into_response()
}

pub async fn train(State(state): State<Arc<AppState>>) -> Response {
    let trainer = state.trainer.clone();
    let outcome = tokio::task::spawn_blocking(move || trainer.run()).await;

    match outcome {
        Ok(Ok(report)) => {
            tracing::info!(
                target: "http",
                rows = report.dataset_rows,
                accuracy = ?report.evaluation.accuracy,
                "train request completed"
            );
            (StatusCode::OK, TRAINED_MESSAGE).into_response()
        }
        Ok(Err(err)) => {
            tracing::error!(target: "http", error = %err, "train request failed");
            let status = match err {
                TrainError::AlreadyRunning => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, format!("Training failed: {err}")).into_response()
        }
        Err(join_err) => {
            tracing::error!(target: "http", error = %join_err, "training task aborted");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Training failed: {join_err}"),
            )
                .into_response()
        }
    }
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Path(claim): Path<String>,
) -> Response {
    match state.predictor.predict(&claim) {
        Ok(result) => Json(result).into_response(),
        Err(PredictError::Unavailable(err)) => {
            tracing::debug!(
                target: "http",
                vectorizer_missing = err.vectorizer_missing,
                classifier_missing = err.classifier_missing,
                "prediction requested without a loaded model"
            );
            (StatusCode::SERVICE_UNAVAILABLE, err.to_string()).into_response()
        }
        Err(PredictError::Failed(err)) => {
            tracing::warn!(target: "http", error = %err, "prediction failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.message })),
            )
                .into_response()
        }
    }
}
