use connectors::{
    adapter::open_writer,
    destination::DataWriter,
    error::{AdapterError, WriteError},
};
use engine_config::layout::TargetLayout;
use model::records::row::RowData;
use std::sync::Arc;

/// One target together with the writer that applies rows to it.
pub struct Destination {
    pub target: Arc<TargetLayout>,
    writer: Box<dyn DataWriter>,
}

impl Destination {
    pub fn new(target: Arc<TargetLayout>, writer: Box<dyn DataWriter>) -> Self {
        Destination { target, writer }
    }

    pub async fn open(target: Arc<TargetLayout>, dry_run: bool) -> Result<Self, AdapterError> {
        let writer = open_writer(target.clone(), dry_run).await?;
        Ok(Destination::new(target, writer))
    }

    pub fn id(&self) -> &str {
        &self.target.id
    }

    pub async fn write_batch(&self, rows: &[RowData]) -> Result<(), WriteError> {
        self.writer.write(rows).await
    }

    pub async fn close(&self) -> Result<(), WriteError> {
        self.writer.close().await
    }
}
