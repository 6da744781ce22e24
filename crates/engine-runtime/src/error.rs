use connectors::error::{AdapterError, WriteError};
use connectors::file::csv::error::FileError;
use engine_config::error::{ConfigError, LayoutError};
use engine_core::{
    error::{CheckpointError, ResolveError},
    hooks::HookError,
};
use thiserror::Error;

use crate::execution::state::PipelineState;

/// Top-level errors for an upload run.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Input layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Input error: {0}")]
    Source(#[from] FileError),

    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("[Target ID: {target_id}] unable to connect: {source}")]
    Connect {
        target_id: String,
        #[source]
        source: AdapterError,
    },

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// One target failed a batch. The checkpoint has been saved.
    #[error("[Target ID: {target_id}] error: {source}")]
    Target {
        target_id: String,
        #[source]
        source: TargetError,
    },

    #[error("Uploader cannot run from state {0}")]
    InvalidState(PipelineState),
}

/// Why a single target's batch failed.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("pre-batch hook failed: {0}")]
    PrepareHook(#[source] HookError),

    #[error("post-batch hook failed: {0}")]
    CleanUpHook(#[source] HookError),
}
