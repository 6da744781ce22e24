use serde::Serialize;

/// A fixed-size, ordered slice of raw source rows.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SourceBatch {
    /// Zero-based index of the first data row (the header is not counted).
    pub index: usize,
    pub rows: Vec<Vec<String>>,
}

impl SourceBatch {
    pub fn new(index: usize, rows: Vec<Vec<String>>) -> Self {
        SourceBatch { index, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Inclusive 1-based line range of the batch, as reported to operators.
    pub fn line_range(&self) -> (usize, usize) {
        (self.index + 1, self.index + self.rows.len())
    }
}
