use crate::{
    error::{TargetError, UploadError},
    execution::{processor::TargetProcessor, state::PipelineState, summary::RunSummary},
};
use engine_config::{layout::Layout, loader::ConfigLoader, options::RunOptions};
use engine_core::{
    connectors::{destination::Destination, source::Source},
    hooks::ProcessorHook,
    state::Checkpoint,
};
use futures::future::join_all;
use model::records::batch::SourceBatch;
use serde::Serialize;
use std::{path::Path, sync::Arc};
use tracing::{debug, error, info, warn};

/// Loads `options.config_path`, connects every target and uploads the whole
/// input. Sources and writers are closed whatever the outcome.
pub async fn run(
    options: RunOptions,
    loader: &ConfigLoader,
    hook: Option<Arc<dyn ProcessorHook>>,
) -> Result<RunSummary, UploadError> {
    let mut uploader = Uploader::new(options, loader, hook).await?;
    let result = uploader.run().await;
    uploader.close().await;
    result
}

/// Drives batches from the source through every target processor, in
/// declaration order, recording progress in the checkpoint.
pub struct Uploader {
    options: RunOptions,
    layout: Arc<Layout>,
    source: Source,
    processors: Vec<TargetProcessor>,
    checkpoint: Checkpoint,
    state: PipelineState,
}

impl Uploader {
    /// Setup: configuration, source header, layout validation, target
    /// connections and, when resuming, the checkpoint. Any failure here
    /// happens before a single row is written.
    pub async fn new(
        options: RunOptions,
        loader: &ConfigLoader,
        hook: Option<Arc<dyn ProcessorHook>>,
    ) -> Result<Self, UploadError> {
        let config = loader.load(&options.config_path)?;
        let prepared = config.prepare()?;

        let source = Source::open(
            &prepared.input,
            &options.input_path,
            prepared.settings.batch_size(),
        )?;
        let layout = prepared.materialize(source.header())?;

        let mut destinations = Vec::with_capacity(layout.targets.len());
        for target in &layout.targets {
            let destination = Destination::open(target.clone(), options.dry_run)
                .await
                .map_err(|source| UploadError::Connect {
                    target_id: target.id.clone(),
                    source,
                })?;
            destinations.push(destination);
        }

        Self::from_parts(options, layout, source, destinations, hook)
    }

    /// Assembles an uploader from already opened parts. The input layout is
    /// checked against the source header.
    pub fn from_parts(
        options: RunOptions,
        layout: Layout,
        source: Source,
        destinations: Vec<Destination>,
        hook: Option<Arc<dyn ProcessorHook>>,
    ) -> Result<Self, UploadError> {
        layout.input.validate(source.header())?;

        let mut checkpoint = Checkpoint::new(
            &options.config_path.display().to_string(),
            &options.input_path.display().to_string(),
            layout.settings.batch_size(),
            layout.target_ids(),
        );
        if options.resume {
            checkpoint.load(&options.checkpoint_path)?;
        }

        let processors = destinations
            .into_iter()
            .map(|destination| {
                TargetProcessor::new(destination, layout.input.clone(), hook.clone())
            })
            .collect();

        Ok(Uploader {
            options,
            layout: Arc::new(layout),
            source,
            processors,
            checkpoint,
            state: PipelineState::Idle,
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn checkpoint(&self) -> &Checkpoint {
        &self.checkpoint
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Runs every batch to completion or to the first failure. Once running,
    /// any failure saves the checkpoint before the error is returned.
    pub async fn run(&mut self) -> Result<RunSummary, UploadError> {
        if self.state != PipelineState::Idle {
            return Err(UploadError::InvalidState(self.state));
        }

        self.state = PipelineState::Running;
        let result = self.run_batches().await;
        self.state = match result {
            Ok(_) => PipelineState::Completed,
            Err(_) => PipelineState::Failed,
        };
        result
    }

    async fn run_batches(&mut self) -> Result<RunSummary, UploadError> {
        if self.options.verbose {
            dump("Config", &*self.layout);
        }
        if self.checkpoint.is_loaded() {
            info!(
                saved_at = ?self.checkpoint.timestamp,
                reason = %self.checkpoint.error,
                "[Check Point] resuming previous session"
            );
            if self.options.verbose {
                dump("Check Point", &self.checkpoint);
            }
        }

        let mut summary = RunSummary::new(self.layout.target_ids());
        let delay = self.layout.settings.delay();

        // Data-row index just past the last batch every target finished.
        let mut next_index = 0;

        loop {
            let batch = match self.source.fetch_batch() {
                Ok(Some(batch)) => batch,
                Ok(None) => break,
                Err(e) => return Err(self.abort(next_index, e.into())),
            };
            if self.options.verbose {
                dump("Batch", &batch);
            }
            summary.record_read(batch.len());

            let projected = batch
                .rows
                .iter()
                .enumerate()
                .map(|(offset, row)| self.layout.input.project(row, batch.index + offset))
                .collect::<Result<Vec<_>, _>>();
            let rows = match projected {
                Ok(rows) => rows,
                Err(e) => return Err(self.abort(batch.index, e.into())),
            };

            if self.options.concurrent_targets {
                self.process_concurrently(&batch, &rows, &mut summary).await?;
            } else {
                self.process_sequentially(&batch, &rows, &mut summary).await?;
            }
            next_index = batch.index + batch.len();

            if !delay.is_zero() {
                debug!(delay_ms = delay.as_millis() as u64, "Waiting before next batch");
            }
            tokio::time::sleep(delay).await;
        }

        info!(
            batches = summary.batches_read,
            rows = summary.rows_read,
            "Upload completed"
        );
        Ok(summary)
    }

    async fn process_sequentially(
        &mut self,
        batch: &SourceBatch,
        rows: &[Vec<String>],
        summary: &mut RunSummary,
    ) -> Result<(), UploadError> {
        let (first, last) = batch.line_range();

        for processor in &self.processors {
            let target_id = processor.id();
            if self.checkpoint.should_skip(target_id, batch.index) {
                info!(
                    "[Target ID: {}] line {} to {} already processed in previous session",
                    target_id, first, last
                );
                summary.record_skipped(target_id);
                continue;
            }

            self.checkpoint.set_progress(target_id, batch.index);
            match processor.process(rows, batch.index).await {
                Ok(written) => {
                    info!(
                        "[Target ID: {}] successfully uploaded line {} to {}",
                        target_id, first, last
                    );
                    summary.record_written(target_id, written);
                }
                Err(source) => {
                    return Err(fail(
                        &mut self.checkpoint,
                        &self.options.checkpoint_path,
                        target_id,
                        source,
                    ));
                }
            }
        }

        Ok(())
    }

    /// Same contract as the sequential path, with the batch written to all
    /// pending targets at once. When several targets fail, the first one in
    /// declaration order is reported.
    async fn process_concurrently(
        &mut self,
        batch: &SourceBatch,
        rows: &[Vec<String>],
        summary: &mut RunSummary,
    ) -> Result<(), UploadError> {
        let (first, last) = batch.line_range();

        let mut pending = Vec::with_capacity(self.processors.len());
        for processor in &self.processors {
            let target_id = processor.id();
            if self.checkpoint.should_skip(target_id, batch.index) {
                info!(
                    "[Target ID: {}] line {} to {} already processed in previous session",
                    target_id, first, last
                );
                summary.record_skipped(target_id);
                continue;
            }
            self.checkpoint.set_progress(target_id, batch.index);
            pending.push(processor);
        }

        let results = join_all(
            pending
                .iter()
                .map(|processor| processor.process(rows, batch.index)),
        )
        .await;

        let mut failure = None;
        for (processor, result) in pending.iter().zip(results) {
            let target_id = processor.id();
            match result {
                Ok(written) => {
                    info!(
                        "[Target ID: {}] successfully uploaded line {} to {}",
                        target_id, first, last
                    );
                    summary.record_written(target_id, written);
                }
                Err(source) if failure.is_none() => failure = Some((target_id, source)),
                Err(source) => {
                    error!("[Target ID: {}] error: {}", target_id, source);
                }
            }
        }

        match failure {
            Some((target_id, source)) => Err(fail(
                &mut self.checkpoint,
                &self.options.checkpoint_path,
                target_id,
                source,
            )),
            None => Ok(()),
        }
    }

    /// Fails the run on an error that is not tied to a target. Every target
    /// has finished the rows before `resume_at`, so progress moves up to it
    /// before the checkpoint is saved.
    fn abort(&mut self, resume_at: usize, err: UploadError) -> UploadError {
        self.checkpoint.advance_all(resume_at);
        save_checkpoint(&mut self.checkpoint, &self.options.checkpoint_path, err)
    }

    /// Releases the source and every target connection. Errors are logged.
    pub async fn close(&mut self) {
        self.source.close();
        for processor in &self.processors {
            if let Err(e) = processor.close().await {
                warn!(target_id = %processor.id(), "Failed to close target: {}", e);
            }
        }
    }
}

/// Saves the checkpoint with the failure as its reason. A failed save is
/// logged and the original error is still returned.
fn fail(
    checkpoint: &mut Checkpoint,
    path: &Path,
    target_id: &str,
    source: TargetError,
) -> UploadError {
    let err = UploadError::Target {
        target_id: target_id.to_string(),
        source,
    };
    save_checkpoint(checkpoint, path, err)
}

fn save_checkpoint(checkpoint: &mut Checkpoint, path: &Path, err: UploadError) -> UploadError {
    if let Err(save_err) = checkpoint.save(path, &err) {
        error!(path = %path.display(), "unable to save checkpoint: {}", save_err);
    }

    err
}

fn dump<T: Serialize>(label: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => debug!("[{}] {}", label, json),
        Err(e) => warn!("[{}] unable to serialize: {}", label, e),
    }
}
