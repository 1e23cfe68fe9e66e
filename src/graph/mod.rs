//! Graph value model
//!
//! The data that crosses the mapper boundary:
//! - Property values and insertion-ordered property bags
//! - Node identity and labels
//! - Nodes as returned by a session

pub mod node;
pub mod property;
pub mod types;

// Re-export main types
pub use node::GraphNode;
pub use property::{
    from_properties, to_properties, ConversionError, Point, PropertyMap, PropertyValue,
};
pub use types::{Label, NodeId};
