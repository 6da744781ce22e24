use crate::{destination::DataWriter, error::WriteError, kv::redis::adapter::RedisAdapter};
use async_trait::async_trait;
use engine_config::layout::{
    TargetLayout,
    kinds::{REDIS_KEY_FIELD, REDIS_TTL_FIELD, REDIS_VALUE_FIELD},
};
use model::{core::value::Value, records::row::RowData};
use std::sync::Arc;
use tracing::debug;

/// One `SET` command derived from a resolved row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisEntry {
    pub key: String,
    pub value: String,
    /// Expiry in seconds; `None` keeps the key forever.
    pub ttl: Option<u64>,
}

impl RedisEntry {
    pub fn from_row(row: &RowData) -> Result<Self, WriteError> {
        let key = row
            .get_value(REDIS_KEY_FIELD)
            .as_string()
            .ok_or_else(|| WriteError::InvalidRow("redis key is null".to_string()))?;

        let value = row
            .get_value(REDIS_VALUE_FIELD)
            .as_string()
            .unwrap_or_default();

        let raw_ttl = row.get_value(REDIS_TTL_FIELD);
        let ttl = match &raw_ttl {
            Value::Null => None,
            other => other.as_i64(),
        }
        .ok_or_else(|| WriteError::InvalidRow(format!("unknown TTL value: {raw_ttl}")))?;

        Ok(RedisEntry {
            key,
            value,
            ttl: u64::try_from(ttl).ok().filter(|&secs| secs > 0),
        })
    }
}

pub struct RedisDestination {
    adapter: RedisAdapter,
    target: Arc<TargetLayout>,
}

impl RedisDestination {
    pub fn new(adapter: RedisAdapter, target: Arc<TargetLayout>) -> Self {
        RedisDestination { adapter, target }
    }
}

#[async_trait]
impl DataWriter for RedisDestination {
    async fn write(&self, rows: &[RowData]) -> Result<(), WriteError> {
        let entries = rows
            .iter()
            .map(RedisEntry::from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let mut pipe = redis::pipe();
        for entry in &entries {
            let cmd = pipe.cmd("SET").arg(&entry.key).arg(&entry.value);
            if let Some(ttl) = entry.ttl {
                cmd.arg("EX").arg(ttl);
            }
            cmd.ignore();
        }

        let mut conn = self.adapter.connection();
        let _: () = pipe.query_async(&mut conn).await?;

        debug!(target_id = %self.target.id, keys = entries.len(), "Batch written to Redis");
        Ok(())
    }
}
