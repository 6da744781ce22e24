use crate::{
    destination::DataWriter,
    error::WriteError,
    sql::mysql::{
        adapter::MySqlAdapter,
        params::MySqlParamStore,
        query::{insert_statement, update_statement, upsert_clause},
    },
};
use async_trait::async_trait;
use engine_config::layout::{TargetLayout, TargetMode};
use model::records::row::RowData;
use mysql_async::{TxOpts, prelude::*};
use std::sync::Arc;
use tracing::debug;

/// Positions of a target's fields, split for `UPDATE` statements.
#[derive(Debug, Clone, PartialEq, Eq)]
struct UpdatePlan {
    set: Vec<usize>,
    filter: Vec<usize>,
}

impl UpdatePlan {
    fn new(target: &TargetLayout) -> Self {
        let (filter, set): (Vec<usize>, Vec<usize>) =
            (0..target.fields.len()).partition(|&pos| target.fields[pos].filter_query);
        UpdatePlan { set, filter }
    }
}

pub struct MySqlDestination {
    adapter: MySqlAdapter,
    target: Arc<TargetLayout>,
}

impl MySqlDestination {
    pub fn new(adapter: MySqlAdapter, target: Arc<TargetLayout>) -> Self {
        MySqlDestination { adapter, target }
    }
}

fn check_width(target: &TargetLayout, row: &RowData) -> Result<(), WriteError> {
    if row.len() != target.fields.len() {
        return Err(WriteError::InvalidRow(format!(
            "row has {} values, target '{}' declares {} fields",
            row.len(),
            target.id,
            target.fields.len()
        )));
    }
    Ok(())
}

/// Statement and parameters for a batch insert, with the conflict clause
/// appended in upsert mode.
fn build_insert(
    target: &TargetLayout,
    rows: &[RowData],
) -> Result<(String, MySqlParamStore), WriteError> {
    let columns: Vec<&str> = target.fields.iter().map(|f| f.name.as_str()).collect();
    let mut sql = insert_statement(&target.data_name, &columns, rows.len());

    if target.mode == TargetMode::Upsert {
        let replace: Vec<&str> = target.replace_fields().map(|f| f.name.as_str()).collect();
        let noop = target
            .unique_fields()
            .next()
            .map(|f| f.name.as_str())
            .or(columns.first().copied())
            .unwrap_or_default();
        sql.push_str(&upsert_clause(&replace, noop));
    }

    let mut params = MySqlParamStore::default();
    for row in rows {
        check_width(target, row)?;
        for field in &row.field_values {
            params.push(&field.value);
        }
    }

    Ok((sql, params))
}

/// One `UPDATE` per row.
fn build_updates(
    target: &TargetLayout,
    rows: &[RowData],
) -> Result<Vec<(String, MySqlParamStore)>, WriteError> {
    let plan = UpdatePlan::new(target);
    if plan.set.is_empty() {
        return Err(WriteError::InvalidRow(format!(
            "target '{}' has no non-filter fields to update",
            target.id
        )));
    }

    let name = |pos: &usize| target.fields[*pos].name.as_str();
    let set: Vec<&str> = plan.set.iter().map(name).collect();
    let filter: Vec<&str> = plan.filter.iter().map(name).collect();
    let sql = update_statement(&target.data_name, &set, &filter);

    rows.iter()
        .map(|row| {
            check_width(target, row)?;
            let values = plan
                .set
                .iter()
                .chain(plan.filter.iter())
                .map(|&pos| &row.field_values[pos].value);
            Ok((sql.clone(), MySqlParamStore::from_values(values)))
        })
        .collect()
}

#[async_trait]
impl DataWriter for MySqlDestination {
    async fn write(&self, rows: &[RowData]) -> Result<(), WriteError> {
        if rows.is_empty() {
            return Ok(());
        }

        let statements = match self.target.mode {
            TargetMode::Insert | TargetMode::Upsert => vec![build_insert(&self.target, rows)?],
            TargetMode::Update => build_updates(&self.target, rows)?,
        };

        let mut tx = self.adapter.pool().start_transaction(TxOpts::default()).await?;
        for (sql, params) in &statements {
            debug!(target_id = %self.target.id, params = params.len(), "{}", sql);
            tx.exec_drop(sql.as_str(), params.params()).await?;
        }
        tx.commit().await?;

        debug!(target_id = %self.target.id, rows = rows.len(), mode = %self.target.mode, "Batch committed");
        Ok(())
    }

    async fn close(&self) -> Result<(), WriteError> {
        self.adapter.disconnect().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_config::{
        config::TargetFieldConfig,
        layout::{Connection, TargetHeader, TargetKind, fields::normalize_target_fields},
    };
    use model::{core::value::Value, records::row::FieldValue};

    fn target(mode: TargetMode, fields: &[TargetFieldConfig]) -> TargetLayout {
        TargetLayout::new(
            TargetHeader {
                kind: TargetKind::MySql,
                id: "t1".into(),
                name: "shop".into(),
                data_name: "users".into(),
                connection: Connection {
                    host: "localhost".into(),
                    port: 3306,
                    username: String::new(),
                    password: String::new(),
                    database: "shop".into(),
                },
                mode,
            },
            normalize_target_fields("t1", fields, '^').unwrap(),
            false,
        )
    }

    #[test]
    fn update_plan_partitions_by_filter_flag() {
        let layout = target(
            TargetMode::Update,
            &[
                TargetFieldConfig::named("name"),
                TargetFieldConfig {
                    filter_query: true,
                    ..TargetFieldConfig::named("id")
                },
                TargetFieldConfig::named("age"),
            ],
        );
        assert_eq!(
            UpdatePlan::new(&layout),
            UpdatePlan {
                set: vec![0, 2],
                filter: vec![1]
            }
        );
    }

    fn row(values: Vec<(&str, Value)>) -> RowData {
        RowData::new(
            "t1",
            values
                .into_iter()
                .map(|(name, value)| FieldValue {
                    name: name.into(),
                    value,
                })
                .collect(),
        )
    }

    #[test]
    fn insert_binds_every_row() {
        let layout = target(
            TargetMode::Insert,
            &[TargetFieldConfig::named("id"), TargetFieldConfig::named("name")],
        );
        let rows = vec![
            row(vec![("id", Value::Int(1)), ("name", Value::String("a".into()))]),
            row(vec![("id", Value::Int(2)), ("name", Value::Null)]),
        ];

        let (sql, params) = build_insert(&layout, &rows).unwrap();
        assert_eq!(sql, "INSERT INTO `users` (`id`, `name`) VALUES (?, ?), (?, ?)");
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn upsert_appends_conflict_clause() {
        let layout = target(
            TargetMode::Upsert,
            &[
                TargetFieldConfig {
                    unique_value: true,
                    ..TargetFieldConfig::named("id")
                },
                TargetFieldConfig {
                    replace_old_value: true,
                    ..TargetFieldConfig::named("name")
                },
            ],
        );
        let rows = vec![row(vec![("id", Value::Int(1)), ("name", Value::Null)])];

        let (sql, _) = build_insert(&layout, &rows).unwrap();
        assert!(sql.ends_with(" ON DUPLICATE KEY UPDATE `name` = VALUES(`name`)"));
    }

    #[test]
    fn upsert_without_replace_fields_is_a_noop_on_conflict() {
        let layout = target(
            TargetMode::Upsert,
            &[TargetFieldConfig {
                unique_value: true,
                ..TargetFieldConfig::named("id")
            }],
        );
        let rows = vec![row(vec![("id", Value::Int(1))])];
        let (sql, _) = build_insert(&layout, &rows).unwrap();
        assert!(sql.ends_with(" ON DUPLICATE KEY UPDATE `id` = `id`"));
    }

    #[test]
    fn update_binds_set_then_filter_values() {
        let layout = target(
            TargetMode::Update,
            &[
                TargetFieldConfig {
                    filter_query: true,
                    ..TargetFieldConfig::named("id")
                },
                TargetFieldConfig::named("name"),
            ],
        );
        let rows = vec![
            row(vec![("id", Value::Int(1)), ("name", Value::String("a".into()))]),
            row(vec![("id", Value::Int(2)), ("name", Value::String("b".into()))]),
        ];

        let statements = build_updates(&layout, &rows).unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].0, "UPDATE `users` SET `name` = ? WHERE `id` = ?");
        let first: Vec<_> = statements[1].1.params.iter().map(|p| p.value().clone()).collect();
        assert_eq!(
            first,
            vec![
                mysql_async::Value::Bytes(b"b".to_vec()),
                mysql_async::Value::Int(2)
            ]
        );
    }

    #[test]
    fn row_width_mismatch_is_invalid() {
        let layout = target(
            TargetMode::Insert,
            &[TargetFieldConfig::named("id"), TargetFieldConfig::named("name")],
        );
        let rows = vec![row(vec![("id", Value::Int(1))])];
        assert!(matches!(
            build_insert(&layout, &rows),
            Err(WriteError::InvalidRow(_))
        ));
    }
}
