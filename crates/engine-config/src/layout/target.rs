use crate::{
    error::ConfigError,
    layout::{
        fields::TargetField,
        kinds::{TargetKind, TargetMode},
    },
};
use serde::Serialize;
use std::collections::HashMap;

/// Where a target lives. The password never appears in dumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub host: String,
    pub port: u16,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// Database name for relational targets.
    pub database: String,
}

/// Target definition before its field list is final.
#[derive(Debug, Clone)]
pub struct TargetHeader {
    pub kind: TargetKind,
    pub id: String,
    pub name: String,
    pub data_name: String,
    pub connection: Connection,
    pub mode: TargetMode,
}

/// Resolved, immutable target with lookup tables over its fields.
#[derive(Debug, Clone, Serialize)]
pub struct TargetLayout {
    pub kind: TargetKind,
    pub id: String,
    pub name: String,
    /// Table name for relational targets.
    pub data_name: String,
    pub connection: Connection,
    pub mode: TargetMode,
    /// Fields were generated from the input fields.
    pub injected: bool,
    pub fields: Vec<TargetField>,

    #[serde(skip)]
    by_id: HashMap<String, usize>,
    #[serde(skip)]
    name_to_id: HashMap<String, String>,
    #[serde(skip)]
    unique: Vec<usize>,
    #[serde(skip)]
    replace: Vec<usize>,
    #[serde(skip)]
    filter: Vec<usize>,
}

impl TargetLayout {
    pub fn new(header: TargetHeader, fields: Vec<TargetField>, injected: bool) -> Self {
        let by_id = fields
            .iter()
            .enumerate()
            .map(|(pos, f)| (f.id.clone(), pos))
            .collect();
        let name_to_id = fields
            .iter()
            .map(|f| (f.name.clone(), f.id.clone()))
            .collect();
        let positions = |pred: fn(&TargetField) -> bool| -> Vec<usize> {
            fields
                .iter()
                .enumerate()
                .filter(|(_, f)| pred(f))
                .map(|(pos, _)| pos)
                .collect()
        };
        let unique = positions(|f| f.unique_value);
        let replace = positions(|f| f.replace_old_value);
        let filter = positions(|f| f.filter_query);

        TargetLayout {
            kind: header.kind,
            id: header.id,
            name: header.name,
            data_name: header.data_name,
            connection: header.connection,
            mode: header.mode,
            injected,
            fields,
            by_id,
            name_to_id,
            unique,
            replace,
            filter,
        }
    }

    pub fn field(&self, id: &str) -> Option<&TargetField> {
        self.by_id.get(id).map(|&pos| &self.fields[pos])
    }

    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.name_to_id.get(name).map(String::as_str)
    }

    pub fn unique_fields(&self) -> impl Iterator<Item = &TargetField> {
        self.unique.iter().map(|&pos| &self.fields[pos])
    }

    pub fn replace_fields(&self) -> impl Iterator<Item = &TargetField> {
        self.replace.iter().map(|&pos| &self.fields[pos])
    }

    pub fn filter_fields(&self) -> impl Iterator<Item = &TargetField> {
        self.filter.iter().map(|&pos| &self.fields[pos])
    }

    /// Checks the requirements each target kind places on the final layout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.kind {
            TargetKind::MySql => {
                if self.data_name.is_empty() {
                    return Err(ConfigError::MissingTableName {
                        target: self.id.clone(),
                    });
                }
                if self.mode == TargetMode::Update && self.filter.is_empty() {
                    return Err(ConfigError::MissingFilterFields {
                        target: self.id.clone(),
                    });
                }
            }
            TargetKind::Redis => {}
        }

        for required in self.kind.required_fields() {
            if self.id_for_name(required).is_none() {
                return Err(ConfigError::MissingRequiredField {
                    target: self.id.clone(),
                    field: required.to_string(),
                });
            }
        }

        Ok(())
    }
}
