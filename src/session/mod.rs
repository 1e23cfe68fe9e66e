//! Session: the boundary between the mapper and a live database
//!
//! The mapper only needs something that can run one Cypher statement with a
//! parameter bundle and hand back records. [`Session`] is that seam;
//! [`HttpSession`] implements it over the Neo4j HTTP transactional endpoint.

pub mod http;
pub mod record;

use async_trait::async_trait;
use thiserror::Error;

use crate::graph::PropertyMap;

pub use http::HttpSession;
pub use record::{Record, ResultSet, Value};

/// Errors raised by a session while running a statement
#[derive(Error, Debug)]
pub enum SessionError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The server rejected the statement (syntax, constraint violation, ...)
    #[error("Query error [{code}]: {message}")]
    Query { code: String, message: String },

    /// The server could not be reached or answered with an unexpected status
    #[error("Connection error: {0}")]
    Connection(String),

    /// The session was closed before the statement was issued
    #[error("Session is closed")]
    Closed,
}

pub type SessionResult<T> = Result<T, SessionError>;

/// A session capable of executing one statement at a time.
///
/// Implementations must be shareable across tasks; the mapper holds them as
/// `Arc<dyn Session>`.
#[async_trait]
pub trait Session: Send + Sync {
    /// Run a Cypher statement with optional parameters
    async fn run(&self, query: &str, parameters: Option<&PropertyMap>) -> SessionResult<ResultSet>;

    /// Release the session's resources
    async fn close(&self) -> SessionResult<()>;
}
