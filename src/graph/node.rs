//! Nodes as returned by a session

use super::property::{PropertyMap, PropertyValue};
use super::types::{Label, NodeId};
use serde::{Deserialize, Serialize};

/// A node read back from the database
///
/// `identity` is `None` when the transport did not report the engine id
/// for this node (e.g. a stub session, or a projection without metadata).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Engine identity, when exposed
    pub identity: Option<NodeId>,

    /// Labels, when exposed
    pub labels: Vec<Label>,

    /// Node properties in the order the server returned them
    pub properties: PropertyMap,
}

impl GraphNode {
    /// Create a node carrying only properties
    pub fn new(properties: PropertyMap) -> Self {
        GraphNode {
            identity: None,
            labels: Vec::new(),
            properties,
        }
    }

    /// Create a node with a known engine identity
    pub fn with_identity(identity: impl Into<NodeId>, properties: PropertyMap) -> Self {
        GraphNode {
            identity: Some(identity.into()),
            labels: Vec::new(),
            properties,
        }
    }

    pub fn add_label(&mut self, label: impl Into<Label>) {
        let label = label.into();
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
    }

    pub fn has_label(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}
