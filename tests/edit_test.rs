use promptgraph::api::WorkflowContext;
use promptgraph::api::memory::InMemoryNodeStore;
use promptgraph::config::EditorConfig;
use promptgraph::error::EditorError;
use promptgraph::graph::builder::ElementsBuilder;
use promptgraph::graph::edit::{NewNode, delete_node, insert_after, next_sort};
use promptgraph::graph::{Elements, NodeCallbacks, NodeKind};
use promptgraph::ids::SequentialIds;
use std::collections::BTreeSet;

fn ctx() -> WorkflowContext {
    WorkflowContext { company_id: 7, workflow_id: 42, user_id: 3 }
}

fn ids_of(elements: &Elements) -> Vec<String> {
    elements.iter().map(|el| el.id().to_string()).collect()
}

fn links(elements: &Elements) -> BTreeSet<(String, String)> {
    elements.edges().map(|e| (e.source.clone(), e.target.clone())).collect()
}

#[tokio::test]
async fn test_insert_splices_into_existing_edge() {
    let elements = ElementsBuilder::new()
        .source("A").sort(1).done()
        .action("B").sort(3).done()
        .connect("A", "B")
        .build();

    let store = InMemoryNodeStore::new();
    let ids = SequentialIds::new("n");
    let updated = insert_after(&elements, &NewNode::new("A", NodeKind::Action), &ctx(), &store, &ids, &EditorConfig::default())
        .await
        .expect("insert failed");

    assert_eq!(ids_of(&updated), vec!["A", "B", "n1", "eA-n1", "en1-B"]);
    assert_eq!(updated.node("n1").unwrap().data.sort, Some(4));
    assert!(!links(&updated).contains(&("A".to_string(), "B".to_string())));

    // 服务端收到的请求
    let row = store.get("n1").expect("node not persisted");
    assert_eq!(row.use_input, "A");
    assert_eq!(row.sort, Some(4));
    assert_eq!(row.prompt, "");
}

#[tokio::test]
async fn test_insert_after_leaf_adds_single_edge() {
    let elements = ElementsBuilder::new()
        .source("A").sort(1).done()
        .action("B").sort(3).done()
        .build();

    let store = InMemoryNodeStore::new();
    let ids = SequentialIds::new("n");
    let updated = insert_after(&elements, &NewNode::new("A", NodeKind::Action), &ctx(), &store, &ids, &EditorConfig::default())
        .await
        .unwrap();

    assert_eq!(ids_of(&updated), vec!["A", "B", "n1", "eA-n1"]);
    assert_eq!(updated.node("B"), elements.node("B"));
}

#[tokio::test]
async fn test_insert_does_not_touch_input() {
    let elements = ElementsBuilder::new().chain(&["A", "B", "C"]).build();
    let before = elements.clone();

    let store = InMemoryNodeStore::new();
    let ids = SequentialIds::new("n");
    let updated = insert_after(&elements, &NewNode::new("B", NodeKind::Action), &ctx(), &store, &ids, &EditorConfig::default())
        .await
        .unwrap();

    assert_eq!(elements, before);
    assert_eq!(updated.len(), before.len() + 2);
}

#[tokio::test]
async fn test_parent_keeps_exactly_one_outgoing_edge() {
    let elements = ElementsBuilder::new().chain(&["A", "B"]).build();
    let store = InMemoryNodeStore::new();
    let ids = SequentialIds::new("n");
    let config = EditorConfig::default();

    let once = insert_after(&elements, &NewNode::new("A", NodeKind::Action), &ctx(), &store, &ids, &config).await.unwrap();
    let twice = insert_after(&once, &NewNode::new("A", NodeKind::Placeholder), &ctx(), &store, &ids, &config).await.unwrap();

    assert_eq!(twice.outgoing("A").count(), 1);
    assert_eq!(twice.outgoing("A").next().unwrap().target, "n2");
    // A -> n2 -> n1 -> B
    let expected: BTreeSet<(String, String)> = [("A", "n2"), ("n2", "n1"), ("n1", "B")]
        .iter()
        .map(|(s, t)| (s.to_string(), t.to_string()))
        .collect();
    assert_eq!(links(&twice), expected);
}

#[tokio::test]
async fn test_insert_new_node_defaults() {
    let elements = ElementsBuilder::new()
        .source("A").at(10.0, 20.0).done()
        .build();
    let callbacks = NodeCallbacks {
        on_add: Some("addNode".to_string()),
        on_delete: Some("deleteNode".to_string()),
        on_edit: Some("editNode".to_string()),
        on_select: Some("selectNode".to_string()),
    };

    let store = InMemoryNodeStore::new();
    let ids = SequentialIds::new("n");
    let new_node = NewNode::new("A", NodeKind::Action).with_callbacks(callbacks.clone());
    let updated = insert_after(&elements, &new_node, &ctx(), &store, &ids, &EditorConfig::default()).await.unwrap();

    let node = updated.node("n1").unwrap();
    assert_eq!(node.kind, NodeKind::Action);
    assert_eq!((node.position.x, node.position.y), (210.0, 120.0));
    assert_eq!(node.data.db_id, Some(1));
    assert_eq!(node.data.sort, Some(2));
    assert_eq!(node.data.callbacks, callbacks);
}

#[tokio::test]
async fn test_insert_unknown_parent() {
    let elements = ElementsBuilder::new().chain(&["A"]).build();
    let store = InMemoryNodeStore::new();
    let ids = SequentialIds::new("n");

    let err = insert_after(&elements, &NewNode::new("Z", NodeKind::Action), &ctx(), &store, &ids, &EditorConfig::default())
        .await
        .unwrap_err();

    assert_eq!(err, EditorError::NotFound { what: "node", id: "Z".to_string() });
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_insert_persistence_failure() {
    let elements = ElementsBuilder::new().chain(&["A", "B"]).build();
    let store = InMemoryNodeStore::new();
    store.set_failing(true);
    let ids = SequentialIds::new("n");

    let result = insert_after(&elements, &NewNode::new("A", NodeKind::Action), &ctx(), &store, &ids, &EditorConfig::default()).await;
    assert!(matches!(result, Err(EditorError::PersistenceFailure(_))));
}

#[test]
fn test_next_sort_floor() {
    let unsorted = ElementsBuilder::new().action("A").done().build();
    assert_eq!(next_sort(&unsorted), 2);

    let negative = ElementsBuilder::new().action("A").sort(-5).done().build();
    assert_eq!(next_sort(&negative), 2);

    let sorted = ElementsBuilder::new().action("A").sort(1).done().action("B").sort(9).done().build();
    assert_eq!(next_sort(&sorted), 10);
}

#[test]
fn test_delete_middle_relinks_chain() {
    let elements = ElementsBuilder::new().chain(&["A", "B", "C"]).build();
    let updated = delete_node(&elements, "B").unwrap();

    assert_eq!(updated.references("B"), 0);
    let edge = updated.edges().next().unwrap();
    // 保留入边自身的 id 和 source
    assert_eq!(edge.id, "eA-B");
    assert_eq!(edge.source, "A");
    assert_eq!(edge.target, "C");
    assert_eq!(updated.edges().count(), 1);
    assert_eq!(updated.nodes().count(), 2);
}

#[test]
fn test_delete_leaf() {
    let elements = ElementsBuilder::new().chain(&["A", "B"]).build();
    let updated = delete_node(&elements, "B").unwrap();

    assert_eq!(updated.len(), elements.len() - 2);
    assert_eq!(updated.nodes().count(), 1);
    assert_eq!(updated.edges().count(), 0);
}

#[test]
fn test_delete_root() {
    let elements = ElementsBuilder::new().chain(&["A", "B", "C"]).build();
    let updated = delete_node(&elements, "A").unwrap();

    assert_eq!(updated.references("A"), 0);
    let expected: BTreeSet<(String, String)> = [("B".to_string(), "C".to_string())].into_iter().collect();
    assert_eq!(links(&updated), expected);
}

#[test]
fn test_delete_unknown_node() {
    let elements = ElementsBuilder::new().chain(&["A"]).build();
    assert!(matches!(delete_node(&elements, "nope"), Err(EditorError::NotFound { .. })));
}

#[tokio::test]
async fn test_delete_undoes_insert() {
    let elements = ElementsBuilder::new().chain(&["A", "B", "C"]).build();
    let store = InMemoryNodeStore::new();
    let ids = SequentialIds::new("n");

    for parent in ["A", "B", "C"] {
        let inserted = insert_after(&elements, &NewNode::new(parent, NodeKind::Action), &ctx(), &store, &ids, &EditorConfig::default())
            .await
            .unwrap();
        let new_id = inserted.nodes().last().unwrap().id.clone();
        let restored = delete_node(&inserted, &new_id).unwrap();

        let node_ids: Vec<&str> = restored.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(node_ids, vec!["A", "B", "C"], "parent {}", parent);
        assert_eq!(links(&restored), links(&elements), "parent {}", parent);
    }
}
