use crate::{destination::DataWriter, error::WriteError};
use async_trait::async_trait;
use model::records::row::RowData;
use tracing::info;

/// Logs resolved rows instead of writing them anywhere.
pub struct DryRunWriter {
    target_id: String,
}

impl DryRunWriter {
    pub fn new(target_id: &str) -> Self {
        DryRunWriter {
            target_id: target_id.to_string(),
        }
    }
}

#[async_trait]
impl DataWriter for DryRunWriter {
    async fn write(&self, rows: &[RowData]) -> Result<(), WriteError> {
        for row in rows {
            let json = serde_json::to_string(row).map_err(|e| WriteError::Write(e.to_string()))?;
            info!(target_id = %self.target_id, "[dry-run] {}", json);
        }
        Ok(())
    }
}
