use crate::{
    config::ConfigFile,
    defaults::{DEFAULT_BATCH_SIZE, DEFAULT_DELAY_MS},
    error::ConfigError,
    settings::Markers,
};
use serde::Serialize;
use std::time::Duration;

/// Immutable, validated run settings threaded through setup and the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedSettings {
    /// Rows per batch
    pub batch_size: usize,
    /// Pause after every fully processed batch
    pub delay: Duration,
    pub markers: Markers,
}

impl Default for ValidatedSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            markers: Markers::default(),
        }
    }
}

impl ValidatedSettings {
    pub fn from_config(cfg: &ConfigFile) -> Result<Self, ConfigError> {
        let batch_size = match cfg.batch_size {
            Some(0) => return Err(ConfigError::InvalidBatchSize),
            Some(size) => size,
            None => DEFAULT_BATCH_SIZE,
        };

        let markers = Markers::from_raw(
            cfg.envar_token.as_deref(),
            cfg.reference_token.as_deref(),
        )?;

        Ok(Self {
            batch_size,
            delay: Duration::from_millis(cfg.delay.unwrap_or(DEFAULT_DELAY_MS)),
            markers,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}
