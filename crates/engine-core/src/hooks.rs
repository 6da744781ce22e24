use engine_config::layout::{TargetKind, TargetLayout, TargetMode};
use std::error::Error;

pub type HookError = Box<dyn Error + Send + Sync>;

/// Identifies the target a hook call is made for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookMetadata {
    pub target_id: String,
    pub target_kind: TargetKind,
    pub target_mode: TargetMode,
}

impl HookMetadata {
    pub fn for_target(target: &TargetLayout) -> Self {
        HookMetadata {
            target_id: target.id.clone(),
            target_kind: target.kind,
            target_mode: target.mode,
        }
    }
}

/// Caller-supplied customization around each target batch. Every method
/// defaults to a no-op; an `Err` fails the run like a write failure.
pub trait ProcessorHook: Send + Sync {
    /// Runs before the batch is resolved and written.
    fn prepare_batch(
        &self,
        _meta: &HookMetadata,
        _batch_index: usize,
        _batch_size: usize,
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs after every write attempt, with the error it produced if any.
    fn clean_up_batch(
        &self,
        _meta: &HookMetadata,
        _batch_index: usize,
        _batch_size: usize,
        _batch_error: Option<&(dyn Error + 'static)>,
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// Replaces a field's template before sentinels and references are
    /// considered.
    fn override_base_value(
        &self,
        _meta: &HookMetadata,
        _field_id: &str,
        original: String,
    ) -> Result<String, HookError> {
        Ok(original)
    }

    /// Replaces a field's text after substitution, right before coercion.
    fn override_formatted_value(
        &self,
        _meta: &HookMetadata,
        _field_id: &str,
        formatted: String,
    ) -> Result<String, HookError> {
        Ok(formatted)
    }
}
