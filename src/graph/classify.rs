use std::collections::HashSet;
use serde_json::Value;
use crate::error::{EditorError, EditorResult};
use crate::graph::{Edge, Element, Elements, Node, edge_id};

/// 结构判定：同时带有 position 和 data 的是节点
pub fn is_node(raw: &Value) -> bool {
    raw.get("position").is_some() && raw.get("data").is_some()
}

/// 结构判定：带有不同的 source 和 target 的是边
pub fn is_edge(raw: &Value) -> bool {
    match (raw.get("source"), raw.get("target")) {
        (Some(source), Some(target)) => source != target,
        _ => false,
    }
}

/// Turns one untagged element into the typed union.
/// Exactly one of `is_node` / `is_edge` must hold, anything else is malformed.
pub fn classify(raw: &Value) -> EditorResult<Element> {
    match (is_node(raw), is_edge(raw)) {
        (true, false) => {
            let node: Node = serde_json::from_value(raw.clone())
                .map_err(|e| EditorError::MalformedElement(format!("bad node {}: {}", describe(raw), e)))?;
            Ok(Element::Node(node))
        }
        (false, true) => {
            let mut edge: Edge = serde_json::from_value(raw.clone())
                .map_err(|e| EditorError::MalformedElement(format!("bad edge {}: {}", describe(raw), e)))?;
            if edge.id.is_empty() {
                edge.id = edge_id(&edge.source, &edge.target);
            }
            Ok(Element::Edge(edge))
        }
        (true, true) => Err(EditorError::MalformedElement(format!(
            "{} looks like both a node and an edge",
            describe(raw)
        ))),
        (false, false) => Err(EditorError::MalformedElement(format!(
            "{} is neither a node nor an edge",
            describe(raw)
        ))),
    }
}

/// Classifies a whole list. Node ids must be unique within it.
pub fn classify_all(raw: &Value) -> EditorResult<Elements> {
    let items = raw.as_array()
        .ok_or_else(|| EditorError::MalformedElement("element list must be an array".to_string()))?;

    let mut seen = HashSet::new();
    let mut elements = Elements::new();
    for item in items {
        let element = classify(item)?;
        if let Element::Node(node) = &element {
            if !seen.insert(node.id.clone()) {
                return Err(EditorError::MalformedElement(format!("duplicate node id '{}'", node.id)));
            }
        }
        elements.push(element);
    }
    Ok(elements)
}

fn describe(raw: &Value) -> String {
    match raw.get("id") {
        Some(Value::String(id)) => format!("element '{}'", id),
        Some(other) => format!("element {}", other),
        None => "element without id".to_string(),
    }
}
