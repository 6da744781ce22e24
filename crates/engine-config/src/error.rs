use model::core::data_type::UnknownDataType;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or normalizing the configuration. Always
/// detected before the first batch is read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Unknown config parser type: {0}")]
    UnknownConfigType(String),

    #[error("{scope} name is required")]
    MissingName { scope: String },

    #[error("Duplicate {scope} id: {id}")]
    DuplicateId { scope: String, id: String },

    #[error("Input fields '{first}' and '{second}' share order {order}")]
    DuplicateOrder {
        order: usize,
        first: String,
        second: String,
    },

    #[error("{key} must be a single character, got {value:?}")]
    InvalidMarker { key: &'static str, value: String },

    #[error("Batch size must be greater than zero")]
    InvalidBatchSize,

    #[error("Input delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(String),

    #[error("Target field '{field}': {source}")]
    ValueType {
        field: String,
        #[source]
        source: UnknownDataType,
    },

    #[error("Unknown input type: {0}")]
    UnknownInputKind(String),

    #[error("Unknown target type: {0}")]
    UnknownTargetKind(String),

    #[error("[Target ID: {target}] unknown mode: {mode}")]
    UnknownMode { target: String, mode: String },

    #[error(
        "[Target ID: {target}] deprecated 'upsert: true' conflicts with 'mode: {mode}'; \
         remove one of them"
    )]
    ConflictingMode { target: String, mode: String },

    #[error("[Target ID: {target}] dataName (table name) is required")]
    MissingTableName { target: String },

    #[error("[Target ID: {target}] update mode requires at least one filterQuery field")]
    MissingFilterFields { target: String },

    #[error("[Target ID: {target}] missing field in config: {field}")]
    MissingRequiredField { target: String, field: String },
}

/// Mismatch between the configured input fields and the actual source layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error(
        "The total fields in input file ({available}) is less than total fields in config ({configured})"
    )]
    TooManyFields { configured: usize, available: usize },

    #[error("Config field '{field}' has order {order} but the input file only has {available} columns")]
    OrderOutOfRange {
        field: String,
        order: usize,
        available: usize,
    },

    #[error("Config field '{field}' is referencing to wrong input field '{found}'")]
    ColumnMismatch { field: String, found: String },

    #[error("Row {row} has {len} columns, field '{field}' needs column {order}")]
    ShortRow {
        row: usize,
        field: String,
        order: usize,
        len: usize,
    },
}
