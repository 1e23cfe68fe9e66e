//! Neo4u: a minimal object-graph mapper for Neo4j
//!
//! Declare a Rust type as an [`Entity`] bound to a node label, then use a
//! [`Repository`] to create, find, update and delete nodes with
//! equality filters. Filters and results are insertion-ordered property bags
//! ([`PropertyMap`]); the engine identity travels under the reserved `_id` key.
//!
//! # Architecture
//!
//! - `graph`: property values, property bags, node identity and labels
//! - `model`: metadata registry, Cypher statement builders, the CRUD mapper
//! - `query`: single-statement executor that logs and captures failures
//! - `session`: the `Session` seam and its HTTP implementation
//! - `config` / `logging` / `client`: configuration, tracing bootstrap and
//!   the `Neo4u` facade
//!
//! ## Example Usage
//!
//! ```rust
//! use neo4u::model::statement;
//! use neo4u::{props, Label, Selection};
//!
//! let filter = props! { "name" => "Alice", "city" => "Paris" };
//! let selection = Selection::from_filter(&filter);
//! assert_eq!(
//!     statement::find(&Label::new("Person"), &selection),
//!     "MATCH (n:Person) WHERE n.name = $props.name AND n.city = $props.city RETURN n"
//! );
//! ```

#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod graph;
pub mod logging;
pub mod model;
pub mod query;
pub mod session;

// Re-export main types for convenience
pub use client::Neo4u;

pub use config::{ConfigError, ConfigResult, Configuration, Neo4jConfiguration};

pub use graph::{
    from_properties, to_properties, ConversionError, GraphNode, Label, NodeId, Point, PropertyMap,
    PropertyValue,
};

pub use model::{
    DataType, Entity, EntityMetadata, MetadataRegistry, ModelError, ModelResult, PropertyDescriptor,
    Repository, Selection, IDENTITY_KEY,
};

pub use query::Query;

pub use session::{HttpSession, Record, ResultSet, Session, SessionError, SessionResult, Value};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
