use crate::hooks::HookError;
use model::core::data_type::CoercionError;
use std::path::PathBuf;
use thiserror::Error;

/// A target field could not be turned into a typed value.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Field '{field}' at row {row}: {source}")]
    Coercion {
        field: String,
        row: usize,
        #[source]
        source: CoercionError,
    },

    #[error("Hook failed for field '{field}' at row {row}: {source}")]
    Hook {
        field: String,
        row: usize,
        #[source]
        source: HookError,
    },
}

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("Failed to read checkpoint {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write checkpoint {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed checkpoint {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode checkpoint: {0}")]
    Encode(#[from] serde_json::Error),
}
