use std::fmt;

use serde::Serialize;

use crate::graph_catalog::TYPES_PROPERTY;
use crate::store::value::{ElementId, Row, Value};

/// Rows of one query, with the RETURN labels as columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl RowSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, in row order.
    pub fn column(&self, name: &str) -> Vec<&Value> {
        self.rows.iter().filter_map(|row| row.get(name)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatementResult {
    Rows(RowSet),
    Affected { count: u64 },
    Inserted { alias: Option<String>, id: ElementId },
    Acknowledged,
}

impl StatementResult {
    pub fn rows(&self) -> Option<&RowSet> {
        match self {
            StatementResult::Rows(rows) => Some(rows),
            _ => None,
        }
    }
}

/// Drops bookkeeping properties from returned vertices, recursively.
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::Node(mut node) => {
            node.properties.remove(TYPES_PROPERTY);
            node.properties = node
                .properties
                .into_iter()
                .map(|(key, value)| (key, normalize_value(value)))
                .collect();
            Value::Node(node)
        }
        Value::List(items) => Value::List(items.into_iter().map(normalize_value).collect()),
        Value::Map(map) => Value::Map(
            map.into_iter()
                .map(|(key, value)| (key, normalize_value(value)))
                .collect(),
        ),
        other => other,
    }
}

impl fmt::Display for RowSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.columns.join(" | "))?;
        for row in &self.rows {
            let cells: Vec<String> = row.values().map(Value::to_string).collect();
            writeln!(f, "{}", cells.join(" | "))?;
        }
        write!(
            f,
            "({} row{})",
            self.rows.len(),
            if self.rows.len() == 1 { "" } else { "s" }
        )
    }
}

impl fmt::Display for StatementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementResult::Rows(rows) => rows.fmt(f),
            StatementResult::Affected { count } => write!(f, "{} element(s) affected", count),
            StatementResult::Inserted {
                alias: Some(alias),
                id,
            } => write!(f, "Inserted {} as {}", id, alias),
            StatementResult::Inserted { alias: None, id } => write!(f, "Inserted {}", id),
            StatementResult::Acknowledged => write!(f, "OK"),
        }
    }
}
