pub mod env;
mod loader;

pub use env::{
    AppConfig, ClassifierParams, ConfigError, DirectoryConfig, LoggingConfig, ServerConfig,
    TrainingConfig,
};
pub use loader::load_config;
