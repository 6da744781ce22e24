use crate::{
    config::{InputFieldConfig, TargetFieldConfig},
    error::ConfigError,
    layout::order::assign_orders,
};
use model::core::{
    data_type::DataType,
    tokens::{scan, wrap},
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A normalized input field: identity, position in the raw row and trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputField {
    pub id: String,
    pub name: String,
    pub order: usize,
    pub trim_spaces: bool,
}

impl From<&InputField> for InputFieldConfig {
    fn from(field: &InputField) -> Self {
        InputFieldConfig {
            id: Some(field.id.clone()),
            name: field.name.clone(),
            order: Some(field.order),
            trim_spaces: field.trim_spaces,
        }
    }
}

/// A normalized target field with its parsed value template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetField {
    pub id: String,
    /// Column or slot name in the destination.
    pub name: String,
    pub data_type: DataType,
    /// Template text, possibly containing `^ref^` tokens.
    pub value: String,
    /// Marker-wrapped tokens found in `value`, in order of appearance.
    pub references: Vec<String>,
    pub unique_value: bool,
    pub replace_old_value: bool,
    pub filter_query: bool,
    pub empty_as_nil: bool,
    pub value_if_empty: Option<String>,
}

impl TargetField {
    /// Replaces the template and recomputes its references.
    pub fn set_template(&mut self, value: impl Into<String>, marker: char) {
        self.value = value.into();
        self.references = scan(&self.value, marker);
    }
}

impl From<&TargetField> for TargetFieldConfig {
    fn from(field: &TargetField) -> Self {
        TargetFieldConfig {
            id: Some(field.id.clone()),
            name: field.name.clone(),
            data_type: Some(field.data_type.to_string()),
            value: Some(field.value.clone()),
            unique_value: field.unique_value,
            replace_old_value: field.replace_old_value,
            filter_query: field.filter_query,
            empty_as_nil: field.empty_as_nil,
            value_if_empty: field.value_if_empty.clone(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub fn normalize_input_fields(
    fields: &[InputFieldConfig],
) -> Result<Vec<InputField>, ConfigError> {
    let mut ids = Vec::with_capacity(fields.len());
    let mut seen = HashSet::new();
    let mut explicit: HashMap<usize, &str> = HashMap::new();

    for field in fields {
        if field.name.is_empty() {
            return Err(ConfigError::MissingName {
                scope: "input field".to_string(),
            });
        }

        let id = non_empty(&field.id).unwrap_or(&field.name).to_string();
        if !seen.insert(id.clone()) {
            return Err(ConfigError::DuplicateId {
                scope: "input field".to_string(),
                id,
            });
        }

        if let Some(order) = field.order {
            if let Some(first) = explicit.insert(order, &field.name) {
                return Err(ConfigError::DuplicateOrder {
                    order,
                    first: first.to_string(),
                    second: field.name.clone(),
                });
            }
        }

        ids.push(id);
    }

    let orders = assign_orders(&fields.iter().map(|f| f.order).collect::<Vec<_>>());

    Ok(fields
        .iter()
        .zip(ids)
        .zip(orders)
        .map(|((field, id), order)| InputField {
            id,
            name: field.name.clone(),
            order,
            trim_spaces: field.trim_spaces,
        })
        .collect())
}

pub fn normalize_target_fields(
    target_id: &str,
    fields: &[TargetFieldConfig],
    marker: char,
) -> Result<Vec<TargetField>, ConfigError> {
    let scope = format!("target '{target_id}' field");
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(fields.len());

    for field in fields {
        if field.name.is_empty() {
            return Err(ConfigError::MissingName { scope });
        }

        let id = non_empty(&field.id).unwrap_or(&field.name).to_string();
        if !seen.insert(id.clone()) {
            return Err(ConfigError::DuplicateId { scope, id });
        }

        let data_type = match non_empty(&field.data_type) {
            Some(raw) => raw.parse().map_err(|source| ConfigError::ValueType {
                field: id.clone(),
                source,
            })?,
            None => DataType::default(),
        };

        let mut replace_old_value = field.replace_old_value;
        if field.unique_value && replace_old_value {
            debug!(target_id, field = %id, "Unique field cannot be replaced, ignoring replaceOldValue");
            replace_old_value = false;
        }

        let value = match &field.value {
            Some(value) => value.clone(),
            None => wrap(&id, marker),
        };
        let references = scan(&value, marker);

        normalized.push(TargetField {
            id,
            name: field.name.clone(),
            data_type,
            value,
            references,
            unique_value: field.unique_value,
            replace_old_value,
            filter_query: field.filter_query,
            empty_as_nil: field.empty_as_nil,
            value_if_empty: field.value_if_empty.clone(),
        });
    }

    Ok(normalized)
}

/// One input field per header column, in column order.
pub fn fields_from_header(header: &[String]) -> Vec<InputFieldConfig> {
    header
        .iter()
        .enumerate()
        .map(|(order, column)| InputFieldConfig {
            id: Some(column.clone()),
            name: column.clone(),
            order: Some(order),
            trim_spaces: false,
        })
        .collect()
}

/// One string target field per input field, each referencing that input field.
pub fn fields_from_input(input: &[InputField], marker: char) -> Vec<TargetFieldConfig> {
    input
        .iter()
        .map(|field| TargetFieldConfig {
            id: Some(field.id.clone()),
            name: field.name.clone(),
            data_type: Some(DataType::String.to_string()),
            value: Some(wrap(&field.id, marker)),
            ..Default::default()
        })
        .collect()
}
