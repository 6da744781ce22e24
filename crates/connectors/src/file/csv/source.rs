use crate::{
    file::csv::{error::FileError, settings::CsvSettings},
    source::DataSource,
};
use csv::{ReaderBuilder, StringRecord};
use model::records::batch::SourceBatch;
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info};

pub struct CsvDataSource<R = File> {
    reader: csv::Reader<R>,
    header: Vec<String>,
    batch_size: usize,
    /// Tracks how many data rows have been consumed from the file.
    rows_read: usize,
    exhausted: bool,
}

impl CsvDataSource<File> {
    pub fn open(path: &Path, settings: CsvSettings) -> Result<Self, FileError> {
        if !path.exists() {
            return Err(FileError::NotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        let source = Self::from_reader(file, settings)?;
        info!(path = %path.display(), columns = source.header.len(), "Opened CSV input");
        Ok(source)
    }
}

impl<R: Read> CsvDataSource<R> {
    pub fn from_reader(reader: R, settings: CsvSettings) -> Result<Self, FileError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(settings.delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let header = reader.headers()?.iter().map(str::to_string).collect();

        Ok(CsvDataSource {
            reader,
            header,
            batch_size: settings.batch_size,
            rows_read: 0,
            exhausted: false,
        })
    }
}

impl<R: Read + Send> DataSource for CsvDataSource<R> {
    type Error = FileError;

    fn header(&self) -> &[String] {
        &self.header
    }

    fn next_batch(&mut self) -> Result<Option<SourceBatch>, Self::Error> {
        if self.exhausted {
            return Ok(None);
        }

        let index = self.rows_read;
        let mut rows = Vec::with_capacity(self.batch_size);
        let mut record = StringRecord::new();

        while rows.len() < self.batch_size {
            let more = self
                .reader
                .read_record(&mut record)
                .map_err(|source| FileError::ReadError {
                    row: self.rows_read,
                    source,
                })?;

            if !more {
                self.exhausted = true;
                break;
            }

            self.rows_read += 1;
            rows.push(record.iter().map(str::to_string).collect());
        }

        if rows.is_empty() {
            debug!(rows_read = self.rows_read, "CSV input exhausted");
            return Ok(None);
        }

        debug!(index, rows = rows.len(), "Read CSV batch");
        Ok(Some(SourceBatch::new(index, rows)))
    }
}
