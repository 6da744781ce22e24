use crate::{
    error::ResolveError,
    hooks::{HookError, HookMetadata, ProcessorHook},
};
use chrono::Utc;
use engine_config::layout::{InputLayout, TargetField, TargetLayout};
use model::{
    core::{tokens::strip_markers, value::Value},
    records::row::{FieldValue, RowData},
};

/// Template text that resolves to a store-level null.
pub const NIL: &str = "NIL";
/// Template text that resolves to the time of resolution.
pub const CURRENT_TIMESTAMP: &str = "CURRENT_TIMESTAMP";

/// Turns projected input rows into typed rows for one target.
///
/// Resolution order per field: base-value hook, `NIL` / `CURRENT_TIMESTAMP`
/// sentinels on the raw template, reference substitution, empty-value policy,
/// formatted-value hook, then coercion to the declared type. Sentinels are
/// matched against the template only, so a reference whose value happens to
/// be `NIL` stays text.
pub struct ValueResolver<'a> {
    input: &'a InputLayout,
    target: &'a TargetLayout,
    hook: Option<&'a dyn ProcessorHook>,
    meta: HookMetadata,
}

impl<'a> ValueResolver<'a> {
    pub fn new(
        input: &'a InputLayout,
        target: &'a TargetLayout,
        hook: Option<&'a dyn ProcessorHook>,
    ) -> Self {
        ValueResolver {
            input,
            target,
            hook,
            meta: HookMetadata::for_target(target),
        }
    }

    /// `row` is in input-field list order, as produced by
    /// [`InputLayout::project`]; `row_index` is only used in errors.
    pub fn resolve_field(
        &self,
        field: &TargetField,
        row: &[String],
        row_index: usize,
    ) -> Result<Value, ResolveError> {
        let hook_err = |source: HookError| ResolveError::Hook {
            field: field.id.clone(),
            row: row_index,
            source,
        };

        let mut text = field.value.clone();
        if let Some(hook) = self.hook {
            text = hook
                .override_base_value(&self.meta, &field.id, text)
                .map_err(hook_err)?;
        }

        match text.as_str() {
            NIL => return Ok(Value::Null),
            CURRENT_TIMESTAMP => return Ok(Value::Timestamp(Utc::now())),
            _ => {}
        }

        for reference in &field.references {
            let id = strip_markers(reference);
            // Unknown references resolve to empty text.
            let replacement = self
                .input
                .position(id)
                .and_then(|pos| row.get(pos))
                .map(String::as_str)
                .unwrap_or("");
            text = text.replace(reference.as_str(), replacement);
        }

        if text.is_empty() {
            if field.empty_as_nil {
                return Ok(Value::Null);
            }
            if let Some(fallback) = &field.value_if_empty {
                if fallback == NIL {
                    return Ok(Value::Null);
                }
                text = fallback.clone();
            }
        }

        if let Some(hook) = self.hook {
            text = hook
                .override_formatted_value(&self.meta, &field.id, text)
                .map_err(hook_err)?;
        }

        field
            .data_type
            .coerce(text)
            .map_err(|source| ResolveError::Coercion {
                field: field.id.clone(),
                row: row_index,
                source,
            })
    }

    pub fn resolve_row(&self, row: &[String], row_index: usize) -> Result<RowData, ResolveError> {
        let field_values = self
            .target
            .fields
            .iter()
            .map(|field| {
                Ok(FieldValue {
                    name: field.name.clone(),
                    value: self.resolve_field(field, row, row_index)?,
                })
            })
            .collect::<Result<Vec<_>, ResolveError>>()?;

        Ok(RowData::new(&self.target.id, field_values))
    }

    /// Resolves every row of a batch; `first_row` is the batch's data-row
    /// index in the source.
    pub fn resolve_batch(
        &self,
        rows: &[Vec<String>],
        first_row: usize,
    ) -> Result<Vec<RowData>, ResolveError> {
        rows.iter()
            .enumerate()
            .map(|(offset, row)| self.resolve_row(row, first_row + offset))
            .collect()
    }
}
