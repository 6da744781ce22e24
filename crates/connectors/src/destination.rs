use crate::error::WriteError;
use async_trait::async_trait;
use model::records::row::RowData;

/// Applies resolved rows to one target store.
#[async_trait]
pub trait DataWriter: Send + Sync {
    async fn write(&self, rows: &[RowData]) -> Result<(), WriteError>;

    /// Releases connections. Called once after the run, successful or not.
    async fn close(&self) -> Result<(), WriteError> {
        Ok(())
    }
}
