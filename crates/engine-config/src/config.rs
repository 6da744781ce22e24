//! Configuration file shape, as deserialized. Nothing here is normalized yet;
//! see [`crate::layout`] for the resolved form.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigFile {
    pub input: InputConfig,
    pub targets: Vec<TargetConfig>,

    /// Rows per batch, [`crate::defaults::DEFAULT_BATCH_SIZE`] when absent.
    pub batch_size: Option<usize>,
    /// Milliseconds to wait between batches.
    pub delay: Option<u64>,

    pub envar_token: Option<String>,
    pub reference_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputConfig {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub delimiter: Option<String>,
    pub trim_spaces: bool,
    pub fields: Vec<InputFieldConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputFieldConfig {
    pub id: Option<String>,
    pub name: String,
    pub order: Option<usize>,
    pub trim_spaces: bool,
}

impl InputFieldConfig {
    pub fn named(name: &str) -> Self {
        InputFieldConfig {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TargetConfig {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub id: Option<String>,
    /// Database name for relational targets.
    pub name: String,
    /// Table name for relational targets.
    pub data_name: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// Deprecated alias for `mode: upsert`.
    pub upsert: bool,
    pub mode: Option<String>,
    pub fields: Vec<TargetFieldConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TargetFieldConfig {
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: Option<String>,
    /// Template; defaults to a reference to the input field with the same id.
    pub value: Option<String>,
    pub unique_value: bool,
    pub replace_old_value: bool,
    pub filter_query: bool,
    pub empty_as_nil: bool,
    pub value_if_empty: Option<String>,
}

impl TargetFieldConfig {
    pub fn named(name: &str) -> Self {
        TargetFieldConfig {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }
}
