use std::sync::Arc;

use parking_lot::Mutex;

use crate::{config::TrainingConfig, serving::ServingState};

use super::pipeline::{train_and_persist, TrainError, TrainingReport};

/// Runs training at most once at a time and refreshes serving state after a
/// successful run.
pub struct TrainingCoordinator {
    config: TrainingConfig,
    state: Arc<ServingState>,
    running: Mutex<()>,
}

impl TrainingCoordinator {
    pub fn new(config: TrainingConfig, state: Arc<ServingState>) -> Self {
        Self {
            config,
            state,
            running: Mutex::new(()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_locked()
    }

    pub fn run(&self) -> Result<TrainingReport, TrainError> {
        let Some(_guard) = self.running.try_lock() else {
            tracing::warn!(target: "training", "training request rejected: run already in progress");
            return Err(TrainError::AlreadyRunning);
        };

        let report = train_and_persist(&self.config, self.state.store())?;
        self.state.reload()?;
        Ok(report)
    }
}
