//! Repository: the CRUD surface for one mapped entity type
//!
//! Every operation resolves the entity's label first; that is the only step
//! allowed to fail outward. Session failures are logged by the executor and
//! collapsed here into the operation's "no result" value, so callers cannot
//! tell "nothing matched" from "the database is down".

use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{error, warn};

use super::descriptor::DataType;
use super::registry::MetadataRegistry;
use super::statement::{self, Selection, IDENTITY_KEY, NEW_PROPS, NODE, PROPS};
use super::ModelResult;
use crate::graph::{from_properties, Label, PropertyMap, PropertyValue};
use crate::query::Query;
use crate::session::{Record, ResultSet, Session, Value};

/// CRUD operations for entity type `E` over one session.
pub struct Repository<E> {
    session: Arc<dyn Session>,
    registry: Arc<MetadataRegistry>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            registry: Arc::clone(&self.registry),
            _entity: PhantomData,
        }
    }
}

impl<E: 'static> Repository<E> {
    pub fn new(session: Arc<dyn Session>, registry: Arc<MetadataRegistry>) -> Self {
        Self {
            session,
            registry,
            _entity: PhantomData,
        }
    }

    /// Label `E` is registered under
    pub fn label(&self) -> ModelResult<Label> {
        self.registry.label::<E>()
    }

    /// Create one node from `props`.
    ///
    /// Returns the created node's properties (with `_id` when the session
    /// reports identity), or `None` if nothing came back or the session failed.
    pub async fn create(&self, props: &PropertyMap) -> ModelResult<Option<PropertyMap>> {
        let label = self.label()?;
        let mut parameters = PropertyMap::new();
        parameters.insert(PROPS.to_string(), PropertyValue::Map(props.clone()));

        let text = statement::create(&label, props);
        let Some(result) = self.execute(text, parameters).await else {
            error!("error creating {} node", label);
            return Ok(None);
        };

        match result.records.into_iter().next() {
            Some(record) => Ok(self.bag(record, &label)),
            None => {
                error!("error creating {} node: no record returned", label);
                Ok(None)
            }
        }
    }

    /// Find all nodes matching `filter`, in record order.
    ///
    /// An `_id` key selects by engine identity and overrides every other key.
    pub async fn find(&self, filter: &PropertyMap) -> ModelResult<Vec<PropertyMap>> {
        let label = self.label()?;
        let selection = Selection::from_filter(filter);

        match self.execute(statement::find(&label, &selection), selection.parameters).await {
            Some(result) => Ok(self.bags(result, &label)),
            None => {
                error!("error finding {} nodes", label);
                Ok(Vec::new())
            }
        }
    }

    /// First node matching `filter`
    pub async fn find_one(&self, filter: &PropertyMap) -> ModelResult<Option<PropertyMap>> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    /// Delete matching nodes. `true` unless the session failed; the number of
    /// deleted nodes is not checked.
    ///
    /// An empty filter is refused (`false`, nothing sent) rather than deleting
    /// every node of the label.
    pub async fn delete(&self, filter: &PropertyMap) -> ModelResult<bool> {
        self.remove(filter, false).await
    }

    /// Detach relationships and delete matching nodes
    pub async fn detach_delete(&self, filter: &PropertyMap) -> ModelResult<bool> {
        self.remove(filter, true).await
    }

    async fn remove(&self, filter: &PropertyMap, detach: bool) -> ModelResult<bool> {
        let label = self.label()?;
        let selection = Selection::from_filter(filter);
        if selection.matches_all() {
            error!("refusing to delete every {} node: the filter is empty", label);
            return Ok(false);
        }
        let text = statement::delete(&label, &selection, detach);

        if self.execute(text, selection.parameters).await.is_some() {
            Ok(true)
        } else {
            if detach {
                error!("error detaching and deleting {} nodes", label);
            } else {
                error!("error deleting {} nodes", label);
            }
            Ok(false)
        }
    }

    /// Assign `new_props` on every node matching `filter` and return the
    /// updated nodes.
    ///
    /// The filter travels as `props` (or `id`), the assignments as `newProps`;
    /// the two bundles never share a namespace. An empty filter is refused
    /// (empty result, nothing sent) rather than rewriting every node.
    pub async fn update(
        &self,
        filter: &PropertyMap,
        new_props: &PropertyMap,
    ) -> ModelResult<Vec<PropertyMap>> {
        let label = self.label()?;
        let selection = Selection::from_filter(filter);
        if selection.matches_all() {
            error!("refusing to update every {} node: the filter is empty", label);
            return Ok(Vec::new());
        }
        let text = statement::update(&label, &selection, new_props);

        let mut parameters = selection.parameters;
        if !new_props.is_empty() {
            parameters.insert(NEW_PROPS.to_string(), PropertyValue::Map(new_props.clone()));
        }

        match self.execute(text, parameters).await {
            Some(result) => Ok(self.bags(result, &label)),
            None => {
                error!("error updating {} nodes", label);
                Ok(Vec::new())
            }
        }
    }

    /// [`find`](Self::find), deserializing each bag into `T`.
    ///
    /// Bags that do not deserialize are skipped with a warning.
    pub async fn find_as<T: DeserializeOwned>(&self, filter: &PropertyMap) -> ModelResult<Vec<T>> {
        let bags = self.find(filter).await?;
        Ok(bags
            .iter()
            .filter_map(|bag| match from_properties(bag) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(
                        "skipping {} node that does not fit {}: {}",
                        std::any::type_name::<E>(),
                        std::any::type_name::<T>(),
                        e
                    );
                    None
                }
            })
            .collect())
    }

    /// [`find_one`](Self::find_one), deserializing the bag into `T`
    pub async fn find_one_as<T: DeserializeOwned>(
        &self,
        filter: &PropertyMap,
    ) -> ModelResult<Option<T>> {
        Ok(self.find_as(filter).await?.into_iter().next())
    }

    fn declared_types(&self) -> DeclaredTypes {
        self.registry
            .properties::<E>()
            .into_iter()
            .map(|(name, descriptor)| (name, descriptor.data_type))
            .collect()
    }

    fn bags(&self, result: ResultSet, label: &Label) -> Vec<PropertyMap> {
        extract_all(result, label, &self.declared_types())
    }

    fn bag(&self, record: Record, label: &Label) -> Option<PropertyMap> {
        extract_properties(record, label, &self.declared_types())
    }

    async fn execute(&self, text: String, parameters: PropertyMap) -> Option<ResultSet> {
        let mut query = Query::new(self.session.as_ref(), text, Some(parameters));
        query.run().await;
        query.into_result()
    }
}

fn extract_all(result: ResultSet, label: &Label, declared: &DeclaredTypes) -> Vec<PropertyMap> {
    result
        .records
        .into_iter()
        .filter_map(|record| extract_properties(record, label, declared))
        .collect()
}

/// Declared data type per property name
type DeclaredTypes = Vec<(String, DataType)>;

/// Node properties bound to `n`, with the engine identity under `_id` and
/// declared properties restored to their declared shape.
fn extract_properties(
    mut record: Record,
    label: &Label,
    declared: &DeclaredTypes,
) -> Option<PropertyMap> {
    let node = match record.take(NODE) {
        Some(Value::Node(node)) => node,
        other => {
            warn!("{} record has no node under '{}': {:?}", label, NODE, other);
            return None;
        }
    };

    let mut properties = node.properties;
    for (name, data_type) in declared {
        if let Some(value) = properties.get_mut(name) {
            *value = data_type.coerce(std::mem::replace(value, PropertyValue::Null));
        }
    }

    if let Some(identity) = node.identity {
        if let Some(stored) = properties.get(IDENTITY_KEY) {
            warn!(
                "{} node {} has a stored '{}' property ({}); replacing it with the identity",
                label, identity, IDENTITY_KEY, stored
            );
        }
        properties.insert(IDENTITY_KEY.to_string(), PropertyValue::Integer(identity.as_i64()));
    }
    Some(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphNode;
    use crate::props;

    #[test]
    fn test_extract_without_identity() {
        let record = Record::with_node("n", GraphNode::new(props! { "name" => "test" }));
        let bag = extract_properties(record, &Label::new("Test"), &Vec::new()).unwrap();
        assert_eq!(bag, props! { "name" => "test" });
    }

    #[test]
    fn test_extract_with_identity() {
        let node = GraphNode::with_identity(9, props! { "name" => "test" });
        let record = Record::with_node("n", node);
        let bag = extract_properties(record, &Label::new("Test"), &Vec::new()).unwrap();
        assert_eq!(bag, props! { "name" => "test", "_id" => 9i64 });
    }

    #[test]
    fn test_identity_replaces_stored_id_property() {
        let node = GraphNode::with_identity(9, props! { "_id" => "user-set" });
        let record = Record::with_node("n", node);
        let bag = extract_properties(record, &Label::new("Test"), &Vec::new()).unwrap();
        assert_eq!(bag.get("_id"), Some(&PropertyValue::Integer(9)));
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn test_extract_skips_non_node_records() {
        let mut record = Record::new();
        record.bind("n", Value::Property(PropertyValue::Integer(1)));
        assert!(extract_properties(record, &Label::new("Test"), &Vec::new()).is_none());
        assert!(extract_properties(Record::new(), &Label::new("Test"), &Vec::new()).is_none());
    }

    #[test]
    fn test_extract_coerces_declared_dates() {
        let record = Record::with_node(
            "n",
            GraphNode::new(props! {
                "born" => "1970-01-01T00:00:01Z",
                "nickname" => "1970-01-01T00:00:01Z",
            }),
        );
        let declared = vec![("born".to_string(), DataType::Date)];
        let bag = extract_properties(record, &Label::new("Test"), &declared).unwrap();
        assert_eq!(bag.get("born"), Some(&PropertyValue::DateTime(1000)));
        assert_eq!(bag.get("nickname"), Some(&PropertyValue::from("1970-01-01T00:00:01Z")));
    }
}
