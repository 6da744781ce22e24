use engine_config::defaults::DEFAULT_BATCH_SIZE;

#[derive(Debug, Clone, Copy)]
pub struct CsvSettings {
    pub delimiter: u8,
    /// Rows per emitted batch.
    pub batch_size: usize,
}

impl Default for CsvSettings {
    fn default() -> Self {
        CsvSettings {
            delimiter: b',',
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl CsvSettings {
    /// The delimiter was checked to be a single ASCII character when the
    /// configuration was prepared.
    pub fn new(delimiter: char, batch_size: usize) -> Self {
        CsvSettings {
            delimiter: delimiter as u8,
            batch_size,
        }
    }
}
