use serde::Serialize;

/// Per-target counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetSummary {
    pub target_id: String,
    pub batches_written: usize,
    pub rows_written: usize,
    /// Batches skipped because a resumed checkpoint showed them done.
    pub batches_skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub batches_read: usize,
    pub rows_read: usize,
    pub targets: Vec<TargetSummary>,
}

impl RunSummary {
    pub fn new<I, S>(target_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RunSummary {
            batches_read: 0,
            rows_read: 0,
            targets: target_ids
                .into_iter()
                .map(|id| TargetSummary {
                    target_id: id.into(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    pub fn target(&self, target_id: &str) -> Option<&TargetSummary> {
        self.targets.iter().find(|t| t.target_id == target_id)
    }

    pub(crate) fn record_read(&mut self, rows: usize) {
        self.batches_read += 1;
        self.rows_read += rows;
    }

    pub(crate) fn record_written(&mut self, target_id: &str, rows: usize) {
        if let Some(entry) = self.entry(target_id) {
            entry.batches_written += 1;
            entry.rows_written += rows;
        }
    }

    pub(crate) fn record_skipped(&mut self, target_id: &str) {
        if let Some(entry) = self.entry(target_id) {
            entry.batches_skipped += 1;
        }
    }

    fn entry(&mut self, target_id: &str) -> Option<&mut TargetSummary> {
        self.targets.iter_mut().find(|t| t.target_id == target_id)
    }
}
