//! Single-statement executor
//!
//! Wraps one statement, its parameters and a session. Running it never fails
//! outward: a session error is logged together with the statement text and
//! leaves the executor holding no result.

use tracing::{error, info};

use crate::graph::PropertyMap;
use crate::session::{ResultSet, Session};

/// One statement bound to a session
pub struct Query<'a> {
    session: &'a dyn Session,
    text: String,
    parameters: Option<PropertyMap>,
    result: Option<ResultSet>,
}

impl<'a> Query<'a> {
    pub fn new(
        session: &'a dyn Session,
        text: impl Into<String>,
        parameters: Option<PropertyMap>,
    ) -> Self {
        Self {
            session,
            text: text.into(),
            parameters,
            result: None,
        }
    }

    /// Statement text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parameter bundle, if any
    pub fn parameters(&self) -> Option<&PropertyMap> {
        self.parameters.as_ref()
    }

    /// Run the statement, capturing the result set or the failure.
    ///
    /// Returns whether the session accepted the statement.
    pub async fn run(&mut self) -> bool {
        info!("Running query: {}", self.text);
        match self.session.run(&self.text, self.parameters.as_ref()).await {
            Ok(result) => {
                self.result = Some(result);
                true
            }
            Err(e) => {
                error!("Error running query: {}: {}", self.text, e);
                self.result = None;
                false
            }
        }
    }

    /// Result of the last run; `None` before running or after a failure
    pub fn result(&self) -> Option<&ResultSet> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<ResultSet> {
        self.result
    }
}
