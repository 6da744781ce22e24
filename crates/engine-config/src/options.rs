use crate::defaults::DEFAULT_CHECKPOINT_PATH;
use std::path::PathBuf;

/// Per-invocation parameters that are not part of the configuration file.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config_path: PathBuf,
    pub input_path: PathBuf,
    pub checkpoint_path: PathBuf,
    /// Load the checkpoint and skip work it records as done.
    pub resume: bool,
    /// Emit configuration and batch dumps. No behavioral effect.
    pub verbose: bool,
    /// Resolve rows but log them instead of writing to targets.
    pub dry_run: bool,
    /// Write to every target of a batch concurrently.
    pub concurrent_targets: bool,
}

impl RunOptions {
    pub fn new(config_path: impl Into<PathBuf>, input_path: impl Into<PathBuf>) -> Self {
        RunOptions {
            config_path: config_path.into(),
            input_path: input_path.into(),
            checkpoint_path: PathBuf::from(DEFAULT_CHECKPOINT_PATH),
            resume: false,
            verbose: false,
            dry_run: false,
            concurrent_targets: false,
        }
    }

    pub fn with_checkpoint_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint_path = path.into();
        self
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }
}
