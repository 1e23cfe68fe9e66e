//! HttpSession: session over the Neo4j HTTP transactional endpoint
//!
//! Every `run` is an auto-committed single-statement transaction posted to
//! `/db/<database>/tx/commit`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use crate::config::Neo4jConfiguration;
use crate::graph::{GraphNode, NodeId, PropertyMap, PropertyValue};
use crate::session::{Record, ResultSet, Session, SessionError, SessionResult, Value};

/// Session that talks to a Neo4j server over HTTP.
pub struct HttpSession {
    commit_url: String,
    user: String,
    password: String,
    http_client: Client,
    closed: AtomicBool,
}

impl HttpSession {
    /// Create a session for `base_url` (e.g. `http://localhost:7474`).
    pub fn new(base_url: &str, database: &str, user: &str, password: &str) -> Self {
        Self {
            commit_url: format!("{}/db/{}/tx/commit", base_url.trim_end_matches('/'), database),
            user: user.to_string(),
            password: password.to_string(),
            http_client: Client::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Create a session from connection configuration
    pub fn from_config(config: &Neo4jConfiguration) -> Self {
        Self::new(&config.uri(), &config.database, &config.user, &config.password)
    }

    /// URL statements are posted to
    pub fn commit_url(&self) -> &str {
        &self.commit_url
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Session for HttpSession {
    async fn run(&self, query: &str, parameters: Option<&PropertyMap>) -> SessionResult<ResultSet> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }

        let body = request_body(query, parameters);
        debug!("POST {}: {}", self.commit_url, query);

        let response = self
            .http_client
            .post(&self.commit_url)
            .basic_auth(&self.user, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Auth failures and friends still come back as a transaction document
            let error_body: Option<TxResponse> = response.json().await.ok();
            return Err(match error_body.and_then(|b| b.errors.into_iter().next()) {
                Some(e) => SessionError::Query { code: e.code, message: e.message },
                None => {
                    SessionError::Connection(format!("{} returned {}", self.commit_url, status))
                }
            });
        }

        let tx: TxResponse = response.json().await?;
        parse_response(tx)
    }

    async fn close(&self) -> SessionResult<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

fn request_body(query: &str, parameters: Option<&PropertyMap>) -> serde_json::Value {
    let parameters: serde_json::Map<String, serde_json::Value> = parameters
        .map(|p| p.iter().map(|(k, v)| (k.clone(), v.to_parameter_json())).collect())
        .unwrap_or_default();
    serde_json::json!({
        "statements": [{
            "statement": query,
            "parameters": parameters,
        }]
    })
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<RowData>,
}

#[derive(Debug, Deserialize)]
struct RowData {
    #[serde(default)]
    row: Vec<serde_json::Value>,
    #[serde(default)]
    meta: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TxError {
    code: String,
    message: String,
}

fn parse_response(tx: TxResponse) -> SessionResult<ResultSet> {
    if let Some(error) = tx.errors.into_iter().next() {
        return Err(SessionError::Query {
            code: error.code,
            message: error.message,
        });
    }

    let Some(result) = tx.results.into_iter().next() else {
        return Ok(ResultSet::empty());
    };

    let records = result
        .data
        .iter()
        .map(|data| {
            let mut record = Record::new();
            for (i, column) in result.columns.iter().enumerate() {
                let cell = data.row.get(i).unwrap_or(&serde_json::Value::Null);
                record.bind(column.clone(), to_value(cell, data.meta.get(i)));
            }
            record
        })
        .collect();

    Ok(ResultSet::new(result.columns, records))
}

/// Interpret one row cell using its metadata entry.
///
/// Node cells carry `{"type": "node", "id": N}` metadata next to their
/// property map; everything else is a plain value.
fn to_value(cell: &serde_json::Value, meta: Option<&serde_json::Value>) -> Value {
    let node_id = meta
        .filter(|m| m.get("type").and_then(|t| t.as_str()) == Some("node"))
        .and_then(|m| m.get("id"))
        .and_then(|id| id.as_i64());

    match (node_id, cell) {
        (Some(id), serde_json::Value::Object(obj)) => {
            let properties: PropertyMap = obj
                .iter()
                .map(|(k, v)| (k.clone(), PropertyValue::from_json(v)))
                .collect();
            Value::Node(GraphNode::with_identity(NodeId::new(id), properties))
        }
        (_, serde_json::Value::Null) => Value::Null,
        (_, other) => Value::Property(PropertyValue::from_json(other)),
    }
}
