use crate::file::csv::error::FileError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    /// An unsupported input or target type was requested.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// File-related error.
    #[error("File error: {0}")]
    FileError(#[from] FileError),

    #[error("MySQL connection failed: {0}")]
    MySql(#[from] mysql_async::Error),

    #[error("Redis connection failed: {0}")]
    Redis(#[from] redis::RedisError),

    /// Missing required property error.
    #[error("Missing required property: {0}")]
    MissingProperty(String),
}

/// Failure while applying a batch to a target store.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("MySQL error: {0}")]
    MySql(#[from] mysql_async::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A resolved row cannot be applied, e.g. a non-numeric ttl.
    #[error("Invalid row data: {0}")]
    InvalidRow(String),

    /// Writing rows failed at the application level.
    #[error("Write error: {0}")]
    Write(String),
}
