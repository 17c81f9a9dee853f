use std::collections::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::api::ExecutionRequest;
use crate::error::{EditorError, EditorResult};
use crate::graph::{Elements, NodeId};
use crate::layout;

/// `use_input` value marking the node without predecessor
pub const ROOT_SENTINEL: &str = "0";

/// 执行用的扁平 prompt 记录，通过 use_input 指向前驱
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRecord {
    pub id: NodeId,
    pub use_input: String,
    pub prompt: String,
    pub input: String,
    pub background_prompt: String,
}

impl PromptRecord {
    pub fn is_root(&self) -> bool {
        self.use_input == ROOT_SENTINEL
    }
}

/// Flattens the graph into prompt records, one per node, in list order.
/// The order carries no meaning; predecessor links do.
/// Edges with a missing endpoint are skipped, never taken as a predecessor.
pub fn project(elements: &Elements) -> Vec<PromptRecord> {
    let (valid, skipped) = layout::validate(elements);
    for err in &skipped {
        warn!(error = %err, "Edge skipped by projection");
    }

    let mut predecessor: HashMap<&str, &str> = HashMap::new();
    for edge in valid {
        if let Some(existing) = predecessor.get(edge.target.as_str()) {
            warn!(node_id = %edge.target, kept = %existing, ignored = %edge.source, "Node has several predecessors");
            continue;
        }
        predecessor.insert(&edge.target, &edge.source);
    }

    let records: Vec<PromptRecord> = elements.nodes()
        .map(|node| PromptRecord {
            id: node.id.clone(),
            use_input: predecessor.get(node.id.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| ROOT_SENTINEL.to_string()),
            prompt: node.data.prompt.clone(),
            input: node.data.input.clone(),
            background_prompt: node.data.background_prompt.clone(),
        })
        .collect();

    debug!(records = records.len(), "Projected prompt list");
    records
}

/// The single record without predecessor.
pub fn find_root(records: &[PromptRecord]) -> EditorResult<&PromptRecord> {
    let roots: Vec<&PromptRecord> = records.iter().filter(|r| r.is_root()).collect();
    match roots.as_slice() {
        [] => Err(EditorError::NoRoot),
        [root] => Ok(root),
        many => Err(EditorError::AmbiguousRoot(many.iter().map(|r| r.id.clone()).collect())),
    }
}

/// Execution order: the root first, then each successor in turn.
/// Stops early on a cycle; records not reachable from the root are left out.
pub fn ordered(records: &[PromptRecord]) -> EditorResult<Vec<&PromptRecord>> {
    let root = find_root(records)?;

    let mut successor: HashMap<&str, &PromptRecord> = HashMap::new();
    for record in records.iter().filter(|r| !r.is_root()) {
        successor.entry(record.use_input.as_str()).or_insert(record);
    }

    let mut order = vec![root];
    let mut seen: HashSet<&str> = HashSet::from([root.id.as_str()]);
    let mut current = root;
    while let Some(&next) = successor.get(current.id.as_str()) {
        if !seen.insert(next.id.as_str()) {
            warn!(node_id = %next.id, "Cycle in prompt chain");
            break;
        }
        order.push(next);
        current = next;
    }

    Ok(order)
}

/// Builds the execution payload. Blocks with `NoRoot` / `AmbiguousRoot`
/// rather than submitting a chain without a unique entry point.
/// Without an explicit `input` the root node's own input text is used.
pub fn prepare_run(elements: &Elements, input: Option<&str>) -> EditorResult<ExecutionRequest> {
    let prompts = project(elements);
    let root_input = {
        let root = find_root(&prompts)?;
        input.map(str::to_string).unwrap_or_else(|| root.input.clone())
    };

    Ok(ExecutionRequest {
        prompts,
        input: root_input,
    })
}
