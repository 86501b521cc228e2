mod common;

use std::fs;

use plantree_core::{
    lint, params::PlanPath, projection::TabManager, settings::BundledDefaults, BehaviourSelector,
    EditorError, StoreBuilder, StoreEvent, TreeView,
};
use serde_json::{json, Value};

const SCHEMA: &str = r#"{
    "BehaviourEnum": {"ENUM": {"0": ["Idle"]}},
    "PredicateEnum": {"ENUM": {"0": ["Always"]}}
}"#;

const TREE: &str = r#"{
    "name": "root",
    "active": true,
    "run_interval": 0,
    "behaviour": {"Idle": null},
    "transitions": [{"src": ["a"], "dst": ["b"], "predicate": {"Always": null}}],
    "plans": [
        {"name": "a", "behaviour": {"Idle": null}, "transitions": [], "plans": []},
        {"name": "b", "behaviour": {"Idle": null}, "transitions": [], "plans": []}
    ],
    "notes": "kept as-is"
}"#;

#[test]
fn test_fresh_directory_starts_from_bundled_defaults() {
    let (temp_dir, store) = common::create_test_store();

    assert_eq!(store.get_plan_tree().name, "root");
    assert!(!store.get_schema().behaviour_table().is_empty());
    // Nothing is written until the first replacement.
    assert!(!temp_dir.path().join("plan_tree.json").exists());
}

#[test]
fn test_fresh_directory_without_defaults_fails() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let result = StoreBuilder::new()
        .with_data_dir(Some(temp_dir.path()))
        .with_defaults(BundledDefaults::empty())
        .build();

    assert!(matches!(result, Err(EditorError::StartupDataMissing { .. })));
}

#[test]
fn test_documents_survive_reopen() {
    let (temp_dir, mut store) = common::create_test_store();
    store.import_schema(SCHEMA).expect("Failed to import schema");
    store.import_plan_tree(TREE).expect("Failed to import tree");
    let fingerprint = store.schema_fingerprint().clone();
    drop(store);

    let store = common::reopen_store(&temp_dir);
    let tree = store.get_plan_tree();
    assert_eq!(tree.plans.len(), 2);
    assert_eq!(tree.extra["notes"], json!("kept as-is"));
    assert_eq!(store.schema_fingerprint(), &fingerprint);

    let on_disk: Value =
        serde_json::from_str(&fs::read_to_string(temp_dir.path().join("plan_tree.json")).unwrap())
            .unwrap();
    assert_eq!(on_disk["plans"][1]["name"], json!("b"));
    assert_eq!(on_disk["plans"][1]["active"], json!(false));
}

#[test]
fn test_schema_then_tree_updates_every_view() {
    let (_temp_dir, mut store) = common::create_test_store();
    let mut tree_view = TreeView::new(&store);
    let mut selector = BehaviourSelector::attached(&store);
    let mut events = store.subscribe();

    store.import_schema(SCHEMA).unwrap();
    store.import_plan_tree(TREE).unwrap();

    assert!(selector.sync());
    let labels: Vec<_> = selector.options().iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["Idle"]);

    assert!(tree_view.sync());
    assert_eq!(tree_view.tree().paths().len(), 3);

    let kinds: Vec<_> = events
        .drain()
        .into_iter()
        .map(|event| match event {
            StoreEvent::SchemaChanged { .. } => "schema",
            StoreEvent::PlanTreeChanged { .. } => "tree",
        })
        .collect();
    assert_eq!(kinds, vec!["schema", "tree"]);

    assert!(lint(&store.get_plan_tree(), &store.get_schema()).is_empty());
}

#[test]
fn test_invalid_nested_plan_keeps_previous_tree() {
    let (temp_dir, mut store) = common::create_test_store();
    store.import_plan_tree(TREE).unwrap();
    let before = store.get_plan_tree();

    let mut candidate: Value = serde_json::from_str(TREE).unwrap();
    candidate["plans"][1].as_object_mut().unwrap().remove("plans");

    let err = store.replace_plan_tree(&candidate).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "Missing field 'plans' in plan 'b'");
    assert_eq!(store.get_plan_tree(), before);

    let stored = common::reopen_store(&temp_dir);
    assert_eq!(*stored.get_plan_tree(), *before);
}

#[test]
fn test_unreadable_document_is_reported() {
    let (temp_dir, _store) = common::create_test_store();
    fs::write(temp_dir.path().join("schema.json"), "{ not json").unwrap();

    let result = plantree_core::StoreBuilder::new()
        .with_data_dir(Some(temp_dir.path()))
        .build();
    assert!(matches!(result, Err(EditorError::Parse { .. })));
}

#[test]
fn test_graph_edit_written_back_to_store() {
    let (_temp_dir, mut store) = common::create_test_store();
    store.import_plan_tree(TREE).unwrap();
    let mut tabs = TabManager::attached(&store);

    let root = store.get_plan_tree();
    tabs.open(&root, &root).unwrap();
    let view = tabs.active_view_mut().unwrap();
    let b = view.node_by_label("b").unwrap().id;
    let a = view.node_by_label("a").unwrap().id;
    let edge = view.connect(b, "out", a, "in");
    view.set_edge_predicate(edge, json!({"Always": null}));

    let path = PlanPath::from(view.labels().to_vec());
    let plan = view.to_plan().unwrap();
    store.replace_plan_at(path.labels(), plan).unwrap();
    tabs.sync();

    let root = store.get_plan_tree();
    assert_eq!(root.typed_transitions().count(), 2);
    assert_eq!(tabs.active_view().unwrap().edges().len(), 2);
}
