use engine_config::error::ConfigError;
use engine_runtime::error::UploadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid environment: {0}")]
    Env(String),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Upload(#[from] UploadError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}
