use crate::{
    error::LayoutError,
    layout::{fields::InputField, kinds::InputKind},
};
use serde::Serialize;
use std::collections::HashMap;

/// Resolved input side of the layout.
#[derive(Debug, Clone, Serialize)]
pub struct InputLayout {
    pub kind: InputKind,
    pub delimiter: char,
    /// Trim every column, regardless of per-field settings.
    pub trim_spaces: bool,
    /// Fields were generated from the source header.
    pub injected: bool,
    pub fields: Vec<InputField>,

    #[serde(skip)]
    index: HashMap<String, usize>,
    #[serde(skip)]
    name_to_id: HashMap<String, String>,
}

impl InputLayout {
    pub fn new(
        kind: InputKind,
        delimiter: char,
        trim_spaces: bool,
        injected: bool,
        fields: Vec<InputField>,
    ) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(pos, f)| (f.id.clone(), pos))
            .collect();
        let name_to_id = fields
            .iter()
            .map(|f| (f.name.clone(), f.id.clone()))
            .collect();

        InputLayout {
            kind,
            delimiter,
            trim_spaces,
            injected,
            fields,
            index,
            name_to_id,
        }
    }

    /// Position of the field in the projected row.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn field(&self, id: &str) -> Option<&InputField> {
        self.position(id).map(|pos| &self.fields[pos])
    }

    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.name_to_id.get(name).map(String::as_str)
    }

    /// Checks the configured fields against the actual source header.
    pub fn validate(&self, header: &[String]) -> Result<(), LayoutError> {
        if self.fields.len() > header.len() {
            return Err(LayoutError::TooManyFields {
                configured: self.fields.len(),
                available: header.len(),
            });
        }

        for field in &self.fields {
            let Some(column) = header.get(field.order) else {
                return Err(LayoutError::OrderOutOfRange {
                    field: field.name.clone(),
                    order: field.order,
                    available: header.len(),
                });
            };
            if column != &field.name {
                return Err(LayoutError::ColumnMismatch {
                    field: field.name.clone(),
                    found: column.clone(),
                });
            }
        }

        Ok(())
    }

    /// Reorders a raw source row into field-list order, trimming where
    /// configured. The result is indexed by [`InputLayout::position`].
    pub fn project(&self, row: &[String], row_index: usize) -> Result<Vec<String>, LayoutError> {
        self.fields
            .iter()
            .map(|field| {
                let cell = row.get(field.order).ok_or_else(|| LayoutError::ShortRow {
                    row: row_index,
                    field: field.name.clone(),
                    order: field.order,
                    len: row.len(),
                })?;

                if self.trim_spaces || field.trim_spaces {
                    Ok(cell.trim().to_string())
                } else {
                    Ok(cell.clone())
                }
            })
            .collect()
    }
}
