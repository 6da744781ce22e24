use crate::error::CheckpointError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Display, io::ErrorKind, path::Path};
use tracing::{debug, info, warn};

/// Durable record of how far each target got, written only when a run fails.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct Checkpoint {
    pub config_file: String,
    pub input_file: String,
    /// Set when the record was saved.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Reason for the save.
    #[serde(default)]
    pub error: String,
    pub batch_size: usize,
    /// Target id to the zero-based data-row index of the last batch started.
    #[serde(default)]
    pub progress: BTreeMap<String, usize>,
}

impl Checkpoint {
    /// A fresh record with every target at index 0.
    pub fn new<I, S>(config_file: &str, input_file: &str, batch_size: usize, target_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Checkpoint {
            config_file: config_file.to_string(),
            input_file: input_file.to_string(),
            timestamp: None,
            error: String::new(),
            batch_size,
            progress: target_ids.into_iter().map(|id| (id.into(), 0)).collect(),
        }
    }

    /// Overlays a previously saved record. A missing file is not an error and
    /// returns `false`.
    ///
    /// Progress entries from the file replace the fresh ones; targets the file
    /// does not mention keep index 0. The run identity (config, input, batch
    /// size) stays that of the current run and mismatches are reported.
    pub fn load(&mut self, path: &Path) -> Result<bool, CheckpointError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No checkpoint to resume from");
                return Ok(false);
            }
            Err(source) => {
                return Err(CheckpointError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let stored: Checkpoint =
            serde_json::from_str(&content).map_err(|source| CheckpointError::Decode {
                path: path.to_path_buf(),
                source,
            })?;

        if stored.batch_size != self.batch_size {
            warn!(
                previous = stored.batch_size,
                current = self.batch_size,
                "Checkpoint was written with a different batch size"
            );
        }
        if stored.input_file != self.input_file {
            warn!(
                previous = %stored.input_file,
                current = %self.input_file,
                "Checkpoint was written for a different input file"
            );
        }

        self.timestamp = stored.timestamp;
        self.error = stored.error;
        self.progress.extend(stored.progress);

        info!(path = %path.display(), "[Check Point] load last checkpoint from file");
        Ok(true)
    }

    /// Stamps the record with the current time and `reason`, then replaces the
    /// file at `path` with it.
    pub fn save(&mut self, path: &Path, reason: &dyn Display) -> Result<(), CheckpointError> {
        self.timestamp = Some(Utc::now());
        self.error = reason.to_string();

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| CheckpointError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), "Checkpoint saved");
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.timestamp.is_some() || !self.error.is_empty()
    }

    pub fn progress(&self, target_id: &str) -> usize {
        self.progress.get(target_id).copied().unwrap_or(0)
    }

    pub fn set_progress(&mut self, target_id: &str, batch_index: usize) {
        self.progress.insert(target_id.to_string(), batch_index);
    }

    /// Moves every target's progress up to `batch_index`; targets already
    /// past it are left alone.
    pub fn advance_all(&mut self, batch_index: usize) {
        for progress in self.progress.values_mut() {
            *progress = (*progress).max(batch_index);
        }
    }

    /// A batch is skipped only when resuming and the target had already
    /// started a later batch.
    pub fn should_skip(&self, target_id: &str, batch_index: usize) -> bool {
        self.is_loaded() && batch_index < self.progress(target_id)
    }
}
