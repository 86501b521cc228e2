//! Unit tests for the plan tree store.

use std::io;

use serde_json::{json, Value};

use super::*;
use crate::settings::{BundledDefaults, MemorySettings};

fn tree_document() -> Value {
    json!({
        "name": "root",
        "active": true,
        "run_interval": 0,
        "behaviour": {"DefaultBehaviour": null},
        "transitions": [],
        "plans": [
            {"name": "child", "active": true, "run_interval": 5,
             "behaviour": {"Patrol": null}, "transitions": [], "plans": []}
        ]
    })
}

fn schema_document() -> Value {
    json!({
        "BehaviourEnum": {"ENUM": {"0": ["Idle"], "1": ["Patrol", "Roam"]}},
        "PredicateEnum": {"ENUM": {"0": ["Always"]}}
    })
}

fn create_test_store() -> PlanTreeStore {
    let settings = MemorySettings::new()
        .with_document(PLAN_TREE_KEY, tree_document())
        .with_document(SCHEMA_KEY, schema_document());
    PlanTreeStore::open(Box::new(settings), &BundledDefaults::empty())
        .expect("Failed to open store")
}

/// Accepts loads, rejects every write.
struct ReadOnlySettings(MemorySettings);

impl SettingsSource for ReadOnlySettings {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        self.0.load(key)
    }
}

impl Settings for ReadOnlySettings {
    fn save(&mut self, key: &str, _value: &Value) -> Result<()> {
        Err(EditorError::FileSystem {
            path: format!("{key}.json").into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

#[test]
fn test_open_prefers_user_documents() {
    let store = create_test_store();
    assert_eq!(store.get_plan_tree().plans[0].name, "child");
    assert_eq!(store.get_schema().behaviour_table().len(), 2);
    assert_eq!(store.generation(), 0);
}

#[test]
fn test_open_falls_back_to_bundled_defaults() {
    let store = PlanTreeStore::open(Box::new(MemorySettings::new()), &BundledDefaults::builtin())
        .expect("Failed to open store");
    assert_eq!(store.get_plan_tree().name, "root");
    assert!(store
        .get_schema()
        .behaviour_table()
        .contains_alias("SequenceBehaviour"));
}

#[test]
fn test_open_without_any_data_fails() {
    let result = PlanTreeStore::open(Box::new(MemorySettings::new()), &BundledDefaults::empty());
    match result {
        Err(EditorError::StartupDataMissing { key }) => assert_eq!(key, PLAN_TREE_KEY),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("store opened without data"),
    }
}

#[test]
fn test_open_rejects_invalid_stored_tree() {
    let settings = MemorySettings::new().with_document(PLAN_TREE_KEY, json!({"name": "broken"}));
    let result = PlanTreeStore::open(Box::new(settings), &BundledDefaults::builtin());
    assert!(matches!(
        result,
        Err(EditorError::MissingField { field: "behaviour", .. })
    ));
}

#[test]
fn test_replace_plan_tree_swaps_and_notifies() {
    let mut store = create_test_store();
    let mut events = store.subscribe();

    let mut document = tree_document();
    document["name"] = json!("new-root");
    store.replace_plan_tree(&document).unwrap();

    assert_eq!(store.get_plan_tree().name, "new-root");
    assert_eq!(store.generation(), 1);
    match events.try_next() {
        Some(StoreEvent::PlanTreeChanged { tree, generation }) => {
            assert_eq!(tree.name, "new-root");
            assert_eq!(generation, 1);
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(events.try_next().is_none());
}

#[test]
fn test_failed_replace_is_all_or_nothing() {
    let mut store = create_test_store();
    let before = store.get_plan_tree();
    let mut events = store.subscribe();

    let mut candidate = tree_document();
    candidate["plans"][0].as_object_mut().unwrap().remove("plans");

    let err = store.replace_plan_tree(&candidate).unwrap_err();
    match err {
        EditorError::MissingField { field, node } => {
            assert_eq!(field, "plans");
            assert_eq!(node.as_deref(), Some("child"));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(*store.get_plan_tree(), *before);
    assert_eq!(store.generation(), 0);
    assert!(events.try_next().is_none());
}

#[test]
fn test_persistence_failure_keeps_state() {
    let settings = ReadOnlySettings(
        MemorySettings::new()
            .with_document(PLAN_TREE_KEY, tree_document())
            .with_document(SCHEMA_KEY, schema_document()),
    );
    let mut store = PlanTreeStore::open(Box::new(settings), &BundledDefaults::empty()).unwrap();
    let mut events = store.subscribe();

    let mut document = tree_document();
    document["name"] = json!("unsaved");
    let err = store.replace_plan_tree(&document).unwrap_err();

    assert!(matches!(err, EditorError::FileSystem { .. }));
    assert!(!err.is_validation());
    assert_eq!(store.get_plan_tree().name, "root");
    assert!(store.replace_schema(&schema_document()).is_err());
    assert!(events.drain().is_empty());
}

#[test]
fn test_replace_schema_updates_fingerprint() {
    let mut store = create_test_store();
    let before = store.schema_fingerprint().clone();
    let mut events = store.subscribe();

    store
        .replace_schema(&json!({
            "BehaviourEnum": {"ENUM": {"0": ["Idle"]}},
            "PredicateEnum": {"ENUM": {}}
        }))
        .unwrap();

    assert_ne!(*store.schema_fingerprint(), before);
    match events.try_next() {
        Some(StoreEvent::SchemaChanged {
            schema,
            fingerprint,
        }) => {
            assert_eq!(schema.behaviour_table().len(), 1);
            assert_eq!(&fingerprint, store.schema_fingerprint());
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn test_replace_schema_requires_keys() {
    let mut store = create_test_store();
    let err = store
        .replace_schema(&json!({"BehaviourEnum": {"ENUM": {}}}))
        .unwrap_err();
    assert!(matches!(
        err,
        EditorError::MissingSchemaKey {
            key: "PredicateEnum"
        }
    ));
    assert_eq!(store.get_schema().behaviour_table().len(), 2);
}

#[test]
fn test_import_text_reports_parse_errors() {
    let mut store = create_test_store();
    let err = store.import_plan_tree("{\"name\": \"root\",\n}").unwrap_err();
    assert!(matches!(err, EditorError::Parse { line: 2, .. }));
    assert!(store.import_schema("not json").is_err());
}

#[test]
fn test_import_plan_under_parent() {
    let mut store = create_test_store();
    store
        .import_plan(
            &["child"],
            r#"{"name": "grandchild", "behaviour": {}, "transitions": [], "plans": []}"#,
        )
        .unwrap();

    let tree = store.get_plan_tree();
    assert!(tree.descendant(&["child", "grandchild"]).is_some());

    let err = store
        .import_plan(&["missing"], r#"{"name": "x", "behaviour": {}, "transitions": [], "plans": []}"#)
        .unwrap_err();
    assert_eq!(err.to_string(), "Plan '/missing' not found");

    let err = store
        .import_plan::<&str>(&[], r#"{"name": "x", "behaviour": {}}"#)
        .unwrap_err();
    assert!(matches!(err, EditorError::MissingField { field: "transitions", .. }));
}

#[test]
fn test_null_optional_fields_take_defaults() {
    let mut store = create_test_store();
    let mut document = tree_document();
    document["active"] = Value::Null;
    document["plans"][0]["run_interval"] = Value::Null;

    store.replace_plan_tree(&document).unwrap();

    let tree = store.get_plan_tree();
    assert!(!tree.active);
    assert_eq!(tree.plans[0].run_interval, 0);
    assert!(tree.plans[0].active);
}

#[test]
fn test_remove_plan() {
    let mut store = create_test_store();
    let removed = store.remove_plan(&["child"]).unwrap();
    assert_eq!(removed.name, "child");
    assert!(store.get_plan_tree().plans.is_empty());

    assert!(matches!(
        store.remove_plan(&["child"]),
        Err(EditorError::PlanNotFound { .. })
    ));
    assert!(matches!(
        store.remove_plan::<&str>(&[]),
        Err(EditorError::RootRemoval)
    ));
}

#[test]
fn test_replace_plan_at() {
    let mut store = create_test_store();
    let mut plan = store.get_plan_tree().plans[0].clone();
    plan.run_interval = 42;

    store.replace_plan_at(&["child"], plan).unwrap();
    assert_eq!(store.get_plan_tree().plans[0].run_interval, 42);

    let root = PlanNode::new("fresh");
    store.replace_plan_at::<&str>(&[], root).unwrap();
    assert_eq!(store.get_plan_tree().name, "fresh");
    assert_eq!(store.generation(), 2);
}

#[test]
fn test_exports_are_valid_documents() {
    let store = create_test_store();

    let tree: Value = serde_json::from_str(&store.export_plan_tree().unwrap()).unwrap();
    assert_eq!(tree, tree_document());

    let schema: Value = serde_json::from_str(&store.export_schema().unwrap()).unwrap();
    assert_eq!(schema, schema_document());

    let child: Value = serde_json::from_str(&store.export_plan(&["child"]).unwrap()).unwrap();
    assert_eq!(child["run_interval"], json!(5));
    assert!(store.export_plan(&["nope"]).is_err());
}

#[test]
fn test_every_subscriber_sees_every_event() {
    let mut store = create_test_store();
    let mut first = store.subscribe();
    let mut second = store.subscribe();

    store.replace_plan_tree(&tree_document()).unwrap();
    store.replace_schema(&schema_document()).unwrap();

    assert_eq!(first.drain().len(), 2);
    assert_eq!(second.drain().len(), 2);
}
