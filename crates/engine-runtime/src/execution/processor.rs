use crate::error::TargetError;
use engine_config::layout::{InputLayout, TargetLayout};
use engine_core::{
    connectors::destination::Destination,
    hooks::{HookMetadata, ProcessorHook},
    resolve::ValueResolver,
};
use std::{error::Error, sync::Arc};
use tracing::debug;

/// Applies batches to a single target: hooks around resolution and write.
pub struct TargetProcessor {
    destination: Destination,
    input: Arc<InputLayout>,
    hook: Option<Arc<dyn ProcessorHook>>,
    meta: HookMetadata,
}

impl TargetProcessor {
    pub fn new(
        destination: Destination,
        input: Arc<InputLayout>,
        hook: Option<Arc<dyn ProcessorHook>>,
    ) -> Self {
        let meta = HookMetadata::for_target(&destination.target);
        TargetProcessor {
            destination,
            input,
            hook,
            meta,
        }
    }

    pub fn id(&self) -> &str {
        self.destination.id()
    }

    pub fn target(&self) -> &Arc<TargetLayout> {
        &self.destination.target
    }

    /// Processes one batch of projected rows. `batch_index` is the data-row
    /// index of the first row.
    ///
    /// A failing pre-batch hook aborts before anything is written. The
    /// post-batch hook always runs after the write attempt and receives its
    /// error; a failure of the hook itself takes precedence.
    pub async fn process(
        &self,
        rows: &[Vec<String>],
        batch_index: usize,
    ) -> Result<usize, TargetError> {
        if let Some(hook) = &self.hook {
            hook.prepare_batch(&self.meta, batch_index, rows.len())
                .map_err(TargetError::PrepareHook)?;
        }

        let result = self.apply(rows, batch_index).await;

        if let Some(hook) = &self.hook {
            let batch_error = result
                .as_ref()
                .err()
                .map(|e| e as &(dyn Error + 'static));
            hook.clean_up_batch(&self.meta, batch_index, rows.len(), batch_error)
                .map_err(TargetError::CleanUpHook)?;
        }

        result
    }

    async fn apply(&self, rows: &[Vec<String>], batch_index: usize) -> Result<usize, TargetError> {
        let resolved = {
            let resolver =
                ValueResolver::new(&self.input, &self.destination.target, self.hook.as_deref());
            resolver.resolve_batch(rows, batch_index)?
        };

        debug!(target_id = %self.id(), rows = resolved.len(), "Writing batch");
        self.destination.write_batch(&resolved).await?;
        Ok(resolved.len())
    }

    pub async fn close(&self) -> Result<(), TargetError> {
        Ok(self.destination.close().await?)
    }
}
