use crate::core::value::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldValue {
    /// Physical column (or key) name in the target.
    pub name: String,
    pub value: Value,
}

/// One fully resolved row for a single target, in field declaration order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowData {
    /// Target id the row was resolved for.
    pub entity: String,
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(entity: &str, field_values: Vec<FieldValue>) -> Self {
        RowData {
            entity: entity.to_string(),
            field_values,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values.iter().find(|f| f.name == field)
    }

    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .map(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }

    pub fn len(&self) -> usize {
        self.field_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field_values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_by_exact_name() {
        let row = RowData::new(
            "users",
            vec![
                FieldValue {
                    name: "name".into(),
                    value: Value::String("Ada".into()),
                },
                FieldValue {
                    name: "age".into(),
                    value: Value::Int(36),
                },
            ],
        );

        assert_eq!(row.get_value("age"), Value::Int(36));
        assert_eq!(row.get_value("Age"), Value::Null);
        assert_eq!(row.len(), 2);
    }
}
