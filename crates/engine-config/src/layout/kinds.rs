use crate::{
    defaults::{DEFAULT_MYSQL_PORT, DEFAULT_REDIS_PORT},
    error::ConfigError,
};
use serde::Serialize;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Csv,
}

impl FromStr for InputKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(InputKind::Csv),
            other => Err(ConfigError::UnknownInputKind(other.to_string())),
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Csv => f.write_str("csv"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    MySql,
    Redis,
}

/// Field names a key-value target reads from every resolved row.
pub const REDIS_KEY_FIELD: &str = "key";
pub const REDIS_VALUE_FIELD: &str = "value";
pub const REDIS_TTL_FIELD: &str = "ttl";

impl TargetKind {
    pub fn default_port(&self) -> u16 {
        match self {
            TargetKind::MySql => DEFAULT_MYSQL_PORT,
            TargetKind::Redis => DEFAULT_REDIS_PORT,
        }
    }

    /// Field names that must be present once the layout is materialized.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            TargetKind::MySql => &[],
            TargetKind::Redis => &[REDIS_KEY_FIELD, REDIS_VALUE_FIELD, REDIS_TTL_FIELD],
        }
    }
}

impl FromStr for TargetKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(TargetKind::MySql),
            "redis" => Ok(TargetKind::Redis),
            other => Err(ConfigError::UnknownTargetKind(other.to_string())),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::MySql => f.write_str("mysql"),
            TargetKind::Redis => f.write_str("redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetMode {
    #[default]
    Insert,
    Upsert,
    Update,
}

impl TargetMode {
    pub fn parse(target: &str, raw: &str) -> Result<Self, ConfigError> {
        match raw.to_lowercase().as_str() {
            "insert" => Ok(TargetMode::Insert),
            "upsert" => Ok(TargetMode::Upsert),
            "update" => Ok(TargetMode::Update),
            other => Err(ConfigError::UnknownMode {
                target: target.to_string(),
                mode: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetMode::Insert => "insert",
            TargetMode::Upsert => "upsert",
            TargetMode::Update => "update",
        }
    }
}

impl fmt::Display for TargetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
