//! CRUD behaviour of `Repository` against a stub session

mod common;

use common::{capture_logs, StubSession};
use neo4u::{
    props, DataType, Entity, GraphNode, MetadataRegistry, ModelError, Point, PropertyDescriptor,
    PropertyMap, PropertyValue, Repository,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, PartialEq, Deserialize)]
struct Test {
    name: String,
}

impl Entity for Test {
    const LABEL: &'static str = "Test";

    fn properties() -> Vec<(&'static str, PropertyDescriptor)> {
        vec![("name", PropertyDescriptor::new("name", DataType::String).primary())]
    }
}

struct Unregistered;

struct Site;

impl Entity for Site {
    const LABEL: &'static str = "Site";

    fn properties() -> Vec<(&'static str, PropertyDescriptor)> {
        vec![
            ("name", PropertyDescriptor::new("name", DataType::String)),
            ("loc", PropertyDescriptor::new("loc", DataType::Point)),
            ("opened", PropertyDescriptor::new("opened", DataType::Date)),
        ]
    }
}

fn site_repository(session: &Arc<StubSession>) -> Repository<Site> {
    let registry = Arc::new(MetadataRegistry::new());
    registry.register::<Site>().unwrap();
    Repository::new(session.clone(), registry)
}

fn repository(session: &Arc<StubSession>) -> Repository<Test> {
    let registry = Arc::new(MetadataRegistry::new());
    registry.register::<Test>().unwrap();
    Repository::new(session.clone(), registry)
}

fn node(name: &str) -> GraphNode {
    GraphNode::new(props! { "name" => name })
}

#[tokio::test]
async fn test_create_node() {
    let session = Arc::new(StubSession::returning(vec![node("test")]));
    let repo = repository(&session);

    let created = repo.create(&props! { "name" => "test" }).await.unwrap();

    let (text, params) = session.only_call();
    assert_eq!(text, "CREATE (n:Test $props) RETURN n");
    assert_eq!(params, props! { "props" => props! { "name" => "test" } });
    assert_eq!(created, Some(props! { "name" => "test" }));
}

#[tokio::test]
async fn test_create_attaches_identity() {
    let session = Arc::new(StubSession::returning(vec![GraphNode::with_identity(
        42,
        props! { "name" => "test" },
    )]));
    let created = repository(&session)
        .create(&props! { "name" => "test" })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(created.get("_id"), Some(&PropertyValue::Integer(42)));
    assert_eq!(created.get("name"), Some(&PropertyValue::from("test")));
}

#[tokio::test]
async fn test_create_with_no_records_returns_none() {
    let (logs, _guard) = capture_logs();
    let session = Arc::new(StubSession::empty());
    let result = repository(&session).create(&props! { "name" => "test" }).await.unwrap();
    assert!(result.is_none());

    let logs = logs.contents();
    assert!(logs.contains("Running query: CREATE (n:Test $props) RETURN n"), "{logs}");
    assert!(logs.contains("ERROR"), "{logs}");
    assert!(logs.contains("error creating Test node: no record returned"), "{logs}");
}

#[tokio::test]
async fn test_create_with_point_and_datetime() {
    let session = Arc::new(StubSession::returning(vec![GraphNode::with_identity(
        7,
        props! {
            "name" => "HQ",
            "loc" => Point::wgs84(2.35, 48.85),
            "opened" => "1970-01-02T00:00:00Z",
        },
    )]));
    let props = props! {
        "name" => "HQ",
        "loc" => Point::wgs84(2.35, 48.85),
        "opened" => PropertyValue::DateTime(86_400_000),
    };
    let created = site_repository(&session).create(&props).await.unwrap().unwrap();

    let (text, params) = session.only_call();
    assert_eq!(
        text,
        "CREATE (n:Site {name: $props.name, loc: point($props.loc), \
         opened: datetime($props.opened)}) RETURN n"
    );
    assert_eq!(params, props! { "props" => props.clone() });

    assert_eq!(created.get("loc"), Some(&PropertyValue::Point(Point::wgs84(2.35, 48.85))));
    assert_eq!(created.get("opened"), Some(&PropertyValue::DateTime(86_400_000)));
    assert_eq!(created.get("_id"), Some(&PropertyValue::Integer(7)));
}

#[tokio::test]
async fn test_find_and_update_with_point() {
    let session = Arc::new(StubSession::empty());
    let repo = site_repository(&session);
    repo.find(&props! { "loc" => Point::cartesian(1.0, 2.0) }).await.unwrap();
    repo.update(
        &props! { "name" => "HQ" },
        &props! { "loc" => Point::cartesian(3.0, 4.0) },
    )
    .await
    .unwrap();

    let calls = session.calls();
    assert_eq!(calls[0].0, "MATCH (n:Site) WHERE n.loc = point($props.loc) RETURN n");
    assert_eq!(
        calls[1].0,
        "MATCH (n:Site) WHERE n.name = $props.name SET n.loc = point($newProps.loc) RETURN n"
    );
}

#[tokio::test]
async fn test_create_on_session_failure_returns_none() {
    let session = Arc::new(StubSession::failing());
    let result = repository(&session).create(&props! { "name" => "test" }).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_find_nodes() {
    let session = Arc::new(StubSession::returning(vec![node("test")]));
    let found = repository(&session).find(&props! { "name" => "test" }).await.unwrap();

    let (text, params) = session.only_call();
    assert_eq!(text, "MATCH (n:Test) WHERE n.name = $props.name RETURN n");
    assert_eq!(params, props! { "props" => props! { "name" => "test" } });
    assert_eq!(found, vec![props! { "name" => "test" }]);
}

#[tokio::test]
async fn test_find_preserves_record_order() {
    let session = Arc::new(StubSession::returning(vec![node("c"), node("a"), node("b")]));
    let found = repository(&session).find(&props! { "kind" => "letter" }).await.unwrap();

    let names: Vec<&str> = found
        .iter()
        .map(|bag| bag.get("name").and_then(PropertyValue::as_string).unwrap())
        .collect();
    assert_eq!(names, vec!["c", "a", "b"]);
}

#[tokio::test]
async fn test_find_multi_key_filter_order() {
    let session = Arc::new(StubSession::empty());
    let filter = props! { "name" => "test", "age" => 3, "active" => true };
    let found = repository(&session).find(&filter).await.unwrap();

    let (text, _) = session.only_call();
    assert_eq!(
        text,
        "MATCH (n:Test) WHERE n.name = $props.name AND n.age = $props.age \
         AND n.active = $props.active RETURN n"
    );
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_find_by_identity() {
    let session = Arc::new(StubSession::returning(vec![GraphNode::with_identity(
        5,
        props! { "name" => "test" },
    )]));
    let found = repository(&session)
        .find(&props! { "name" => "ignored", "_id" => 5 })
        .await
        .unwrap();

    let (text, params) = session.only_call();
    assert_eq!(text, "MATCH (n:Test) WHERE ID(n) = $id RETURN n");
    assert_eq!(params, props! { "id" => 5 });
    assert_eq!(found, vec![props! { "name" => "test", "_id" => 5i64 }]);
}

#[tokio::test]
async fn test_find_empty_filter_matches_label() {
    let session = Arc::new(StubSession::empty());
    repository(&session).find(&PropertyMap::new()).await.unwrap();

    let (text, params) = session.only_call();
    assert_eq!(text, "MATCH (n:Test) RETURN n");
    assert_eq!(params, props! { "props" => PropertyMap::new() });
}

#[tokio::test]
async fn test_find_on_session_failure_returns_empty() {
    let session = Arc::new(StubSession::failing());
    let found = repository(&session).find(&props! { "name" => "test" }).await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_find_one_node() {
    let session = Arc::new(StubSession::returning(vec![node("first"), node("second")]));
    let found = repository(&session).find_one(&props! { "name" => "test" }).await.unwrap();
    assert_eq!(found, Some(props! { "name" => "first" }));

    let session = Arc::new(StubSession::empty());
    let found = repository(&session).find_one(&props! { "name" => "test" }).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_find_as_typed() {
    let session = Arc::new(StubSession::returning(vec![
        node("test"),
        GraphNode::new(props! { "other" => 1 }),
    ]));
    let found: Vec<Test> = repository(&session)
        .find_as(&props! { "name" => "test" })
        .await
        .unwrap();
    assert_eq!(found, vec![Test { name: "test".to_string() }]);

    let one: Option<Test> = repository(&session)
        .find_one_as(&PropertyMap::new())
        .await
        .unwrap();
    assert_eq!(one, Some(Test { name: "test".to_string() }));
}

#[tokio::test]
async fn test_delete_node() {
    let session = Arc::new(StubSession::empty());
    let deleted = repository(&session).delete(&props! { "name" => "test" }).await.unwrap();

    let (text, params) = session.only_call();
    assert_eq!(text, "MATCH (n:Test) WHERE n.name = $props.name DELETE n");
    assert_eq!(params, props! { "props" => props! { "name" => "test" } });
    assert!(deleted);
}

#[tokio::test]
async fn test_delete_by_identity() {
    let session = Arc::new(StubSession::empty());
    assert!(repository(&session).delete(&props! { "_id" => 12 }).await.unwrap());

    let (text, params) = session.only_call();
    assert_eq!(text, "MATCH (n:Test) WHERE ID(n) = $id DELETE n");
    assert_eq!(params, props! { "id" => 12 });
}

#[tokio::test]
async fn test_delete_with_empty_filter_is_refused() {
    let session = Arc::new(StubSession::empty());
    let repo = repository(&session);

    assert!(!repo.delete(&PropertyMap::new()).await.unwrap());
    assert!(!repo.detach_delete(&PropertyMap::new()).await.unwrap());
    assert!(session.calls().is_empty());
}

#[tokio::test]
async fn test_delete_on_session_failure_returns_false() {
    let session = Arc::new(StubSession::failing());
    assert!(!repository(&session).delete(&props! { "name" => "test" }).await.unwrap());
}

#[tokio::test]
async fn test_detach_delete_node() {
    let session = Arc::new(StubSession::returning(vec![node("unrelated")]));
    let deleted = repository(&session).detach_delete(&props! { "name" => "test" }).await.unwrap();

    let (text, _) = session.only_call();
    assert_eq!(text, "MATCH (n:Test) WHERE n.name = $props.name DETACH DELETE n");
    assert!(deleted);

    let session = Arc::new(StubSession::failing());
    assert!(!repository(&session).detach_delete(&props! { "_id" => 1 }).await.unwrap());
    let (text, _) = session.only_call();
    assert_eq!(text, "MATCH (n:Test) WHERE ID(n) = $id DETACH DELETE n");
}

#[tokio::test]
async fn test_update_node() {
    let session = Arc::new(StubSession::returning(vec![node("test2")]));
    let updated = repository(&session)
        .update(&props! { "name" => "test" }, &props! { "name" => "test2" })
        .await
        .unwrap();

    let (text, params) = session.only_call();
    assert_eq!(
        text,
        "MATCH (n:Test) WHERE n.name = $props.name SET n.name = $newProps.name RETURN n"
    );
    assert_eq!(
        params,
        props! {
            "props" => props! { "name" => "test" },
            "newProps" => props! { "name" => "test2" },
        }
    );
    assert_eq!(updated, vec![props! { "name" => "test2" }]);
}

#[tokio::test]
async fn test_update_by_identity() {
    let session = Arc::new(StubSession::returning(vec![GraphNode::with_identity(
        3,
        props! { "name" => "renamed", "age" => 4 },
    )]));
    let updated = repository(&session)
        .update(&props! { "_id" => 3 }, &props! { "name" => "renamed", "age" => 4 })
        .await
        .unwrap();

    let (text, params) = session.only_call();
    assert_eq!(
        text,
        "MATCH (n:Test) WHERE ID(n) = $id \
         SET n.name = $newProps.name, n.age = $newProps.age RETURN n"
    );
    assert_eq!(
        params,
        props! { "id" => 3, "newProps" => props! { "name" => "renamed", "age" => 4 } }
    );
    assert_eq!(updated[0].get("_id"), Some(&PropertyValue::Integer(3)));
}

#[tokio::test]
async fn test_update_with_empty_filter_is_refused() {
    let session = Arc::new(StubSession::returning(vec![node("x")]));
    let updated = repository(&session)
        .update(&PropertyMap::new(), &props! { "name" => "x" })
        .await
        .unwrap();

    assert!(updated.is_empty());
    assert!(session.calls().is_empty());
}

#[tokio::test]
async fn test_update_without_new_props() {
    let session = Arc::new(StubSession::returning(vec![node("test")]));
    let updated = repository(&session)
        .update(&props! { "name" => "test" }, &PropertyMap::new())
        .await
        .unwrap();

    let (text, params) = session.only_call();
    assert_eq!(text, "MATCH (n:Test) WHERE n.name = $props.name RETURN n");
    assert_eq!(params, props! { "props" => props! { "name" => "test" } });
    assert!(!params.contains_key("newProps"));
    assert_eq!(updated, vec![props! { "name" => "test" }]);
}

#[tokio::test]
async fn test_update_on_failure_returns_empty() {
    let session = Arc::new(StubSession::failing());
    let updated = repository(&session)
        .update(&props! { "name" => "test" }, &props! { "name" => "x" })
        .await
        .unwrap();
    assert!(updated.is_empty());

    let session = Arc::new(StubSession::empty());
    let updated = repository(&session)
        .update(&props! { "name" => "test" }, &props! { "name" => "x" })
        .await
        .unwrap();
    assert!(updated.is_empty());
}

#[tokio::test]
async fn test_unregistered_entity_fails_without_touching_session() {
    let session = Arc::new(StubSession::returning(vec![node("test")]));
    let registry = Arc::new(MetadataRegistry::new());
    let repo: Repository<Unregistered> = Repository::new(session.clone(), registry);
    let filter = props! { "name" => "test" };

    assert!(matches!(repo.create(&filter).await, Err(ModelError::UnregisteredEntity(_))));
    assert!(matches!(repo.find(&filter).await, Err(ModelError::UnregisteredEntity(_))));
    assert!(matches!(repo.find_one(&filter).await, Err(ModelError::UnregisteredEntity(_))));
    assert!(matches!(repo.delete(&filter).await, Err(ModelError::UnregisteredEntity(_))));
    assert!(matches!(repo.detach_delete(&filter).await, Err(ModelError::UnregisteredEntity(_))));
    assert!(matches!(repo.update(&filter, &filter).await, Err(ModelError::UnregisteredEntity(_))));
    assert!(session.calls().is_empty());
}

#[tokio::test]
async fn test_manual_registration() {
    let session = Arc::new(StubSession::empty());
    let registry = Arc::new(MetadataRegistry::new());
    registry.register_label::<Unregistered>("Manual");
    let repo: Repository<Unregistered> = Repository::new(session.clone(), registry);

    repo.find(&props! { "name" => "x" }).await.unwrap();
    let (text, _) = session.only_call();
    assert_eq!(text, "MATCH (n:Manual) WHERE n.name = $props.name RETURN n");
}
