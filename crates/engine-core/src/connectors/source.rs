use connectors::{
    adapter::Adapter, error::AdapterError, file::csv::error::FileError, source::DataSource,
};
use engine_config::layout::{InputKind, PreparedInput};
use model::records::batch::SourceBatch;
use std::path::Path;

/// The run's input, read batch by batch.
pub struct Source {
    pub name: String,
    pub kind: InputKind,
    primary: Box<dyn DataSource<Error = FileError>>,
}

impl Source {
    pub fn new(name: &str, kind: InputKind, primary: Box<dyn DataSource<Error = FileError>>) -> Self {
        Source {
            name: name.to_string(),
            kind,
            primary,
        }
    }

    pub fn open(input: &PreparedInput, path: &Path, batch_size: usize) -> Result<Self, AdapterError> {
        let primary = Adapter::file(input, path, batch_size)?;
        Ok(Source::new(&path.display().to_string(), input.kind, primary))
    }

    pub fn header(&self) -> &[String] {
        self.primary.header()
    }

    pub fn fetch_batch(&mut self) -> Result<Option<SourceBatch>, FileError> {
        self.primary.next_batch()
    }

    pub fn close(&mut self) {
        self.primary.close();
    }
}
