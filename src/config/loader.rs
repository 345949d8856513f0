use std::{env, net::SocketAddr, path::PathBuf, str::FromStr};

use super::env::{
    AppConfig, ClassifierParams, ConfigError, DirectoryConfig, LoggingConfig, ServerConfig,
    TrainingConfig,
};

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let server = ServerConfig {
            bind_addr: parse_or("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 5000)))?,
        };

        let directories = DirectoryConfig {
            logs_dir: env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string()),
            artifact_dir: env::var("ARTIFACT_DIR").unwrap_or_else(|_| ".".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        let training = TrainingConfig::from_env()?;

        Ok(Self {
            server,
            directories,
            logging,
            training,
        })
    }
}

impl TrainingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = TrainingConfig::default();
        let classifier = ClassifierParams {
            c: parse_or("REGULARIZATION_C", defaults.classifier.c)?,
            max_iter: parse_or("MAX_ITER", defaults.classifier.max_iter)?,
            learning_rate: parse_or("LEARNING_RATE", defaults.classifier.learning_rate)?,
            tolerance: parse_or("TOLERANCE", defaults.classifier.tolerance)?,
        };

        let config = TrainingConfig {
            dataset_path: env::var("DATASET_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.dataset_path),
            text_column: env::var("TEXT_COLUMN").unwrap_or(defaults.text_column),
            label_column: env::var("LABEL_COLUMN").unwrap_or(defaults.label_column),
            max_features: parse_or("MAX_FEATURES", defaults.max_features)?,
            test_size: parse_or("TEST_SIZE", defaults.test_size)?,
            seed: parse_or("SPLIT_SEED", defaults.seed)?,
            classifier,
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::invalid(key, value)),
        _ => Ok(default),
    }
}
