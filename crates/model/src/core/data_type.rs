use crate::core::value::Value;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Declared type of a target field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    String,
    Integer,
    Boolean,
    Decimal,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown value type: {0}")]
pub struct UnknownDataType(pub String);

/// Text that could not be converted to the requested type.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot parse {text:?} as {data_type}")]
pub struct CoercionError {
    pub data_type: DataType,
    pub text: String,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Integer => "integer",
            DataType::Boolean => "boolean",
            DataType::Decimal => "decimal",
        }
    }

    /// Converts resolved text into a typed value.
    pub fn coerce(&self, text: String) -> Result<Value, CoercionError> {
        let fail = |text: String| CoercionError {
            data_type: *self,
            text,
        };

        match self {
            DataType::String => Ok(Value::String(text)),
            DataType::Integer => match text.parse::<i64>() {
                Ok(v) => Ok(Value::Int(v)),
                Err(_) => Err(fail(text)),
            },
            DataType::Decimal => match text.parse::<f64>() {
                Ok(v) => Ok(Value::Float(v)),
                Err(_) => Err(fail(text)),
            },
            DataType::Boolean => match parse_bool(&text) {
                Some(v) => Ok(Value::Boolean(v)),
                None => Err(fail(text)),
            },
        }
    }
}

/// Accepts the canonical spellings only: `1 t T TRUE true True` and
/// `0 f F FALSE false False`.
fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(DataType::String),
            "integer" => Ok(DataType::Integer),
            "boolean" => Ok(DataType::Boolean),
            "decimal" => Ok(DataType::Decimal),
            other => Err(UnknownDataType(other.to_string())),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
