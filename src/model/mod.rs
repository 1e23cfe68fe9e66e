//! Object-graph mapping
//!
//! - `descriptor`: declared property types and the [`Entity`] trait
//! - `registry`: entity type -> label and property metadata
//! - `statement`: Cypher generation from filter/assignment bags
//! - `mapper`: [`Repository`], the CRUD surface

pub mod descriptor;
pub mod mapper;
pub mod registry;
pub mod statement;

use thiserror::Error;

pub use descriptor::{DataType, Entity, PropertyDescriptor};
pub use mapper::Repository;
pub use registry::{EntityMetadata, MetadataRegistry};
pub use statement::{conditions, set_statements, Selection, IDENTITY_KEY};

/// Mapping errors. Only raised for programming errors; data conditions and
/// session failures are reported through the operations' return values.
#[derive(Error, Debug)]
pub enum ModelError {
    /// A CRUD operation was invoked on a type with no bound label
    #[error("Entity {0} has no registered label")]
    UnregisteredEntity(String),

    /// A declared property collides with the reserved identity key
    #[error("Entity {entity} declares reserved property '{property}'")]
    ReservedProperty { entity: String, property: String },
}

pub type ModelResult<T> = Result<T, ModelError>;
