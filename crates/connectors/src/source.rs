use model::records::batch::SourceBatch;

/// A row-oriented input that yields fixed-size batches after its header.
pub trait DataSource: Send {
    type Error;

    /// Column names from the first line of the input.
    fn header(&self) -> &[String];

    /// The next batch, or `None` once the input is exhausted. After the first
    /// `None` every further call returns `None` as well.
    fn next_batch(&mut self) -> Result<Option<SourceBatch>, Self::Error>;

    fn close(&mut self) {}
}
