use promptgraph::error::EditorError;
use promptgraph::graph::builder::ElementsBuilder;
use promptgraph::prompt::{ROOT_SENTINEL, find_root, ordered, prepare_run, project};

#[test]
fn test_project_chain() {
    let elements = ElementsBuilder::new()
        .source("A").prompt("summarise").input("hello").background_prompt("be brief").done()
        .action("B").prompt("translate").done()
        .action("C").prompt("shout").done()
        .connect("A", "B")
        .connect("B", "C")
        .build();

    let records = project(&elements);
    assert_eq!(records.len(), 3);

    let a = records.iter().find(|r| r.id == "A").unwrap();
    assert_eq!(a.use_input, ROOT_SENTINEL);
    assert_eq!(a.prompt, "summarise");
    assert_eq!(a.input, "hello");
    assert_eq!(a.background_prompt, "be brief");

    assert_eq!(records.iter().find(|r| r.id == "B").unwrap().use_input, "A");
    assert_eq!(records.iter().find(|r| r.id == "C").unwrap().use_input, "B");

    assert_eq!(find_root(&records).unwrap().id, "A");
}

#[test]
fn test_ordered_follows_links_not_list_order() {
    let elements = ElementsBuilder::new()
        .action("C").done()
        .action("A").done()
        .action("B").done()
        .connect("B", "C")
        .connect("A", "B")
        .build();

    let records = project(&elements);
    let order: Vec<&str> = ordered(&records).unwrap().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(order, vec!["A", "B", "C"]);
}

#[test]
fn test_ambiguous_root() {
    let elements = ElementsBuilder::new()
        .action("A").done()
        .action("B").done()
        .build();

    let records = project(&elements);
    assert_eq!(
        find_root(&records).unwrap_err(),
        EditorError::AmbiguousRoot(vec!["A".to_string(), "B".to_string()])
    );
}

#[test]
fn test_no_root_in_cycle() {
    let elements = ElementsBuilder::new()
        .action("A").done()
        .action("B").done()
        .connect("A", "B")
        .connect("B", "A")
        .build();

    let records = project(&elements);
    assert_eq!(find_root(&records).unwrap_err(), EditorError::NoRoot);
    assert_eq!(find_root(&[]).unwrap_err(), EditorError::NoRoot);
}

#[test]
fn test_prepare_run_seeds_root_input() {
    let elements = ElementsBuilder::new()
        .source("A").input("from node").done()
        .action("B").done()
        .connect("A", "B")
        .build();

    let request = prepare_run(&elements, None).unwrap();
    assert_eq!(request.input, "from node");
    assert_eq!(request.prompts.len(), 2);

    let request = prepare_run(&elements, Some("override")).unwrap();
    assert_eq!(request.input, "override");
}

#[test]
fn test_prepare_run_blocked_without_unique_root() {
    let elements = ElementsBuilder::new()
        .action("A").done()
        .action("B").done()
        .build();

    assert!(matches!(prepare_run(&elements, None), Err(EditorError::AmbiguousRoot(_))));
}

#[test]
fn test_dangling_edge_is_not_a_predecessor() {
    let elements = ElementsBuilder::new()
        .source("A").input("seed").done()
        .action("B").done()
        .connect("A", "B")
        .connect("ghost", "A")
        .build();

    let records = project(&elements);
    let a = records.iter().find(|r| r.id == "A").unwrap();
    assert_eq!(a.use_input, ROOT_SENTINEL);
    assert_eq!(find_root(&records).unwrap().id, "A");

    let request = prepare_run(&elements, None).unwrap();
    assert_eq!(request.input, "seed");
}
