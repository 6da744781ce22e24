use crate::{
    destination::DataWriter,
    dry_run::DryRunWriter,
    error::AdapterError,
    file::csv::{error::FileError, settings::CsvSettings, source::CsvDataSource},
    kv::redis::{adapter::RedisAdapter, destination::RedisDestination},
    source::DataSource,
    sql::mysql::{adapter::MySqlAdapter, destination::MySqlDestination},
};
use engine_config::layout::{InputKind, PreparedInput, TargetKind, TargetLayout};
use std::{path::Path, sync::Arc};
use tracing::info;

/// A live connection to one target store.
#[derive(Clone)]
pub enum Adapter {
    MySql(MySqlAdapter),
    Redis(RedisAdapter),
}

impl Adapter {
    pub async fn connect(target: &TargetLayout) -> Result<Self, AdapterError> {
        match target.kind {
            TargetKind::MySql => {
                let adapter = MySqlAdapter::connect(&target.connection).await?;
                Ok(Adapter::MySql(adapter))
            }
            TargetKind::Redis => {
                let adapter = RedisAdapter::connect(&target.connection).await?;
                Ok(Adapter::Redis(adapter))
            }
        }
    }

    pub fn into_writer(self, target: Arc<TargetLayout>) -> Box<dyn DataWriter> {
        match self {
            Adapter::MySql(adapter) => Box::new(MySqlDestination::new(adapter, target)),
            Adapter::Redis(adapter) => Box::new(RedisDestination::new(adapter, target)),
        }
    }

    /// Opens the input before the layout is final; its header drives
    /// field injection and validation.
    pub fn file(
        input: &PreparedInput,
        path: &Path,
        batch_size: usize,
    ) -> Result<Box<dyn DataSource<Error = FileError>>, AdapterError> {
        match input.kind {
            InputKind::Csv => {
                let settings = CsvSettings::new(input.delimiter, batch_size);
                Ok(Box::new(CsvDataSource::open(path, settings)?))
            }
        }
    }
}

/// Builds the writer for a target. A dry run never connects to the store.
pub async fn open_writer(
    target: Arc<TargetLayout>,
    dry_run: bool,
) -> Result<Box<dyn DataWriter>, AdapterError> {
    if dry_run {
        info!(target_id = %target.id, kind = %target.kind, "Dry run, rows will be logged only");
        return Ok(Box::new(DryRunWriter::new(&target.id)));
    }

    let adapter = Adapter::connect(&target).await?;
    Ok(adapter.into_writer(target))
}
