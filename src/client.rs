//! Neo4u: facade owning configuration, session and entity registry

use std::sync::Arc;
use tracing::{error, info};

use crate::config::{ConfigResult, Configuration};
use crate::graph::PropertyMap;
use crate::logging;
use crate::model::{Entity, MetadataRegistry, ModelResult, Repository};
use crate::query::Query;
use crate::session::{HttpSession, ResultSet, Session};

/// Entry point: one session, one registry, repositories on demand.
///
/// ```no_run
/// use neo4u::{props, Configuration, Entity, Neo4u};
///
/// struct Person;
/// impl Entity for Person {
///     const LABEL: &'static str = "Person";
/// }
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let neo4u = Neo4u::new(Configuration::default())?;
/// neo4u.register::<Person>()?;
///
/// let people = neo4u.repository::<Person>();
/// let alice = people.create(&props! { "name" => "Alice" }).await?;
/// println!("{:?}", alice);
/// neo4u.close().await;
/// # Ok(())
/// # }
/// ```
pub struct Neo4u {
    config: Configuration,
    session: Arc<dyn Session>,
    registry: Arc<MetadataRegistry>,
}

impl Neo4u {
    /// Validate `config` and open an HTTP session to the configured server
    pub fn new(config: Configuration) -> ConfigResult<Self> {
        config.validate()?;
        let session = Arc::new(HttpSession::from_config(&config.neo4j));
        Ok(Self::with_session(config, session))
    }

    /// Use an existing session instead of building one from `config`
    pub fn with_session(config: Configuration, session: Arc<dyn Session>) -> Self {
        logging::init_default();
        info!("Neo4u ready for {}", config.neo4j.uri());
        Self {
            config,
            session,
            registry: Arc::new(MetadataRegistry::new()),
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn session(&self) -> Arc<dyn Session> {
        Arc::clone(&self.session)
    }

    pub fn registry(&self) -> &Arc<MetadataRegistry> {
        &self.registry
    }

    /// Register an entity type's label and declared properties
    pub fn register<E: Entity>(&self) -> ModelResult<()> {
        self.registry.register::<E>()
    }

    /// CRUD operations for `E` over this instance's session
    pub fn repository<E: 'static>(&self) -> Repository<E> {
        Repository::new(self.session(), Arc::clone(&self.registry))
    }

    /// Run a raw statement. `None` if the session rejected it.
    pub async fn run(&self, query: &str, parameters: Option<PropertyMap>) -> Option<ResultSet> {
        let mut query = Query::new(self.session.as_ref(), query, parameters);
        query.run().await;
        query.into_result()
    }

    /// Close the session. Failures are logged, not raised.
    pub async fn close(&self) {
        if let Err(e) = self.session.close().await {
            error!("Error closing session: {}", e);
        }
    }
}
