//! Result sets returned by a session

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::graph::{GraphNode, PropertyValue};

/// Value bound to one field of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// A node, possibly carrying its engine identity
    Node(GraphNode),
    /// Any non-node value
    Property(PropertyValue),
    /// Null
    Null,
}

impl Value {
    pub fn as_node(&self) -> Option<&GraphNode> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn into_node(self) -> Option<GraphNode> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyValue> {
        match self {
            Value::Property(value) => Some(value),
            _ => None,
        }
    }

    /// JSON rendering used by the CLI
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Node(node) => {
                let properties: serde_json::Map<String, serde_json::Value> = node
                    .properties
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                serde_json::json!({
                    "id": node.identity.map(|id| id.as_i64()),
                    "labels": node.labels.iter().map(|l| l.as_str()).collect::<Vec<_>>(),
                    "properties": properties,
                })
            }
            Value::Property(value) => value.to_json(),
            Value::Null => serde_json::Value::Null,
        }
    }
}

/// A single returned record: field name -> value, in column order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Create a new empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record with a single node bound to `field`
    pub fn with_node(field: impl Into<String>, node: GraphNode) -> Self {
        let mut record = Self::new();
        record.bind(field, Value::Node(node));
        record
    }

    /// Bind a field to a value
    pub fn bind(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    /// Get the value bound to a field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Remove and return the value bound to a field
    pub fn take(&mut self, field: &str) -> Option<Value> {
        self.fields.shift_remove(field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Ordered records returned by one statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Column names
    pub columns: Vec<String>,
    /// Records in the order the server returned them
    pub records: Vec<Record>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    /// Result set with no columns and no records (e.g. for `DELETE`)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of result records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the result is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
