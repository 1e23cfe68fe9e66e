//! Connection configuration
//!
//! Loaded from YAML, then optionally overridden from `NEO4U_*` environment
//! variables:
//!
//! ```yaml
//! neo4j:
//!   protocol: http
//!   host: 127.0.0.1
//!   port: 7474
//!   user: neo4j
//!   password: secret
//!   database: neo4j
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading the configuration file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration document is malformed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A value is out of range or inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The protocol has no session implementation
    #[error("Unsupported protocol '{0}' (expected http or https)")]
    UnsupportedProtocol(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Protocols with a session implementation
pub const SUPPORTED_PROTOCOLS: &[&str] = &["http", "https"];

/// Top-level configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub neo4j: Neo4jConfiguration,
}

/// Where and how to reach the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Neo4jConfiguration {
    /// URI scheme
    pub protocol: String,
    /// Server host name or address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Basic auth user
    pub user: String,
    /// Basic auth password
    pub password: String,
    /// Database name
    pub database: String,
}

impl Default for Neo4jConfiguration {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "127.0.0.1".to_string(),
            port: 7474,
            user: "neo4j".to_string(),
            password: "neo4j".to_string(),
            database: "neo4j".to_string(),
        }
    }
}

impl Neo4jConfiguration {
    /// `<protocol>://<host>:<port>`
    pub fn uri(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }

    /// Reject configurations no session can be built from
    pub fn validate(&self) -> ConfigResult<()> {
        if !SUPPORTED_PROTOCOLS.contains(&self.protocol.as_str()) {
            return Err(ConfigError::UnsupportedProtocol(self.protocol.clone()));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be non-zero".to_string()));
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::Invalid("database must not be empty".to_string()));
        }
        Ok(())
    }
}

impl Configuration {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Override fields from `NEO4U_PROTOCOL`, `NEO4U_HOST`, `NEO4U_PORT`,
    /// `NEO4U_USER`, `NEO4U_PASSWORD` and `NEO4U_DATABASE`.
    pub fn apply_env(self) -> ConfigResult<Self> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let neo4j = &mut self.neo4j;
        if let Some(protocol) = var("NEO4U_PROTOCOL") {
            neo4j.protocol = protocol;
        }
        if let Some(host) = var("NEO4U_HOST") {
            neo4j.host = host;
        }
        if let Some(port) = var("NEO4U_PORT") {
            neo4j.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("NEO4U_PORT is not a port: {}", port)))?;
        }
        if let Some(user) = var("NEO4U_USER") {
            neo4j.user = user;
        }
        if let Some(password) = var("NEO4U_PASSWORD") {
            neo4j.password = password;
        }
        if let Some(database) = var("NEO4U_DATABASE") {
            neo4j.database = database;
        }
        Ok(self)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.neo4j.validate()
    }
}
