use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

pub type ElementId = i64;

/// Property value as stored in, and read back from, the graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Node(NodeValue),
    Edge(EdgeValue),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeValue {
    pub id: ElementId,
    pub label: String,
    pub properties: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeValue {
    pub id: ElementId,
    pub label: String,
    pub start_id: ElementId,
    pub end_id: ElementId,
    pub properties: BTreeMap<String, Value>,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Property equality as the graph evaluates it: integers and floats
    /// compare by numeric value, lists and maps element-wise, and null equals
    /// nothing.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, x)| b.get(key).is_some_and(|y| x.equals(y)))
            }
            (a, b) => a == b,
        }
    }

    /// Converts decoded JSON. Objects shaped like AGE vertices or edges
    /// (`id`, `label`, `properties`, plus `start_id`/`end_id` for edges)
    /// become `Node`/`Edge` values.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::from_json_object(map),
        }
    }

    fn from_json_object(mut map: serde_json::Map<String, serde_json::Value>) -> Value {
        let is_element = map.contains_key("id")
            && map.contains_key("label")
            && map.get("properties").is_some_and(|p| p.is_object());
        if !is_element {
            return Value::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from_json(value)))
                    .collect(),
            );
        }

        let id = map.get("id").and_then(|v| v.as_i64()).unwrap_or_default();
        let label = map
            .get("label")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let properties = match map.remove("properties") {
            Some(serde_json::Value::Object(props)) => props
                .into_iter()
                .map(|(key, value)| (key, Value::from_json(value)))
                .collect(),
            _ => BTreeMap::new(),
        };
        let start_id = map.get("start_id").and_then(|v| v.as_i64());
        let end_id = map.get("end_id").and_then(|v| v.as_i64());
        match (start_id, end_id) {
            (Some(start_id), Some(end_id)) => Value::Edge(EdgeValue {
                id,
                label,
                start_id,
                end_id,
                properties,
            }),
            _ => Value::Node(NodeValue {
                id,
                label,
                properties,
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

/// One result row: column labels paired with values, in projection order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Row { columns }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.columns.get(index).map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.columns.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn map_values(self, mut f: impl FnMut(Value) -> Value) -> Row {
        Row {
            columns: self
                .columns
                .into_iter()
                .map(|(name, value)| (name, f(value)))
                .collect(),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
