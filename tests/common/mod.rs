//! Shared test doubles

#![allow(dead_code)]

use async_trait::async_trait;
use neo4u::{GraphNode, PropertyMap, Record, ResultSet, Session, SessionError, SessionResult};
use std::io;
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;

/// What the stub answers with
pub enum Reply {
    /// One record per node, each bound to `n`
    Nodes(Vec<GraphNode>),
    /// A successful statement with no records
    Empty,
    /// The session rejects the statement
    Fail,
}

/// Session double that records every call and answers with a fixed reply
pub struct StubSession {
    reply: Reply,
    calls: Mutex<Vec<(String, Option<PropertyMap>)>>,
}

impl StubSession {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn returning(nodes: Vec<GraphNode>) -> Self {
        Self::new(Reply::Nodes(nodes))
    }

    pub fn empty() -> Self {
        Self::new(Reply::Empty)
    }

    pub fn failing() -> Self {
        Self::new(Reply::Fail)
    }

    pub fn calls(&self) -> Vec<(String, Option<PropertyMap>)> {
        self.calls.lock().unwrap().clone()
    }

    /// The single call made so far
    pub fn only_call(&self) -> (String, PropertyMap) {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one session call, got {:?}", calls);
        let (text, params) = calls.into_iter().next().unwrap();
        (text, params.expect("statement was sent without parameters"))
    }
}

#[async_trait]
impl Session for StubSession {
    async fn run(&self, query: &str, parameters: Option<&PropertyMap>) -> SessionResult<ResultSet> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), parameters.cloned()));

        match &self.reply {
            Reply::Nodes(nodes) => Ok(ResultSet::new(
                vec!["n".to_string()],
                nodes
                    .iter()
                    .cloned()
                    .map(|node| Record::with_node("n", node))
                    .collect(),
            )),
            Reply::Empty => Ok(ResultSet::empty()),
            Reply::Fail => Err(SessionError::Query {
                code: "Neo.ClientError.Statement.SyntaxError".to_string(),
                message: "Invalid input".to_string(),
            }),
        }
    }

    async fn close(&self) -> SessionResult<()> {
        Ok(())
    }
}

/// Formatted log output collected by [`capture_logs`]
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Route this thread's events into a buffer until the guard drops.
///
/// `#[tokio::test]` runs on a current-thread runtime, so events from the
/// awaited futures land here too.
pub fn capture_logs() -> (LogBuffer, DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (buffer, tracing::subscriber::set_default(subscriber))
}
