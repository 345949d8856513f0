use std::{net::SocketAddr, path::PathBuf};

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
    pub training: TrainingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
    pub artifact_dir: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingConfig {
    pub dataset_path: PathBuf,
    pub text_column: String,
    pub label_column: String,
    pub max_features: usize,
    pub test_size: f64,
    pub seed: u64,
    pub classifier: ClassifierParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassifierParams {
    /// Inverse L2 regularization strength.
    pub c: f64,
    pub max_iter: usize,
    pub learning_rate: f64,
    pub tolerance: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/fake_or_real_news.csv"),
            text_column: "title".to_string(),
            label_column: "label".to_string(),
            max_features: 1000,
            test_size: 0.30,
            seed: 42,
            classifier: ClassifierParams::default(),
        }
    }
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            learning_rate: 0.2,
            tolerance: 1e-6,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ConfigError::invalid("TEST_SIZE", self.test_size));
        }
        if self.max_features == 0 {
            return Err(ConfigError::invalid("MAX_FEATURES", self.max_features));
        }
        if self.text_column.is_empty() {
            return Err(ConfigError::invalid("TEXT_COLUMN", ""));
        }
        if self.label_column.is_empty() {
            return Err(ConfigError::invalid("LABEL_COLUMN", ""));
        }
        self.classifier.validate()
    }
}

impl ClassifierParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(ConfigError::invalid("REGULARIZATION_C", self.c));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ConfigError::invalid("LEARNING_RATE", self.learning_rate));
        }
        if self.max_iter == 0 {
            return Err(ConfigError::invalid("MAX_ITER", self.max_iter));
        }
        if !(self.tolerance >= 0.0) {
            return Err(ConfigError::invalid("TOLERANCE", self.tolerance));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: `{value}`")]
    Invalid { key: &'static str, value: String },
}

impl ConfigError {
    pub fn invalid(key: &'static str, value: impl ToString) -> Self {
        ConfigError::Invalid {
            key,
            value: value.to_string(),
        }
    }
}
