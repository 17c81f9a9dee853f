use std::collections::HashSet;
use tracing::warn;
use crate::api::NodeRecord;
use crate::graph::{Edge, Elements, Node, NodeData, NodeKind};
use crate::prompt::ROOT_SENTINEL;

/// Converts the rows the server returns for a workflow into an element list.
/// Rows whose `use_input` is the root sentinel become sources; every other row
/// is linked to its predecessor. Links to unknown rows or to the row itself
/// are dropped, and a row repeating an earlier uuid is skipped.
pub fn from_records(records: &[NodeRecord]) -> Elements {
    let mut known: HashSet<&str> = HashSet::new();
    let mut kept: Vec<&NodeRecord> = Vec::with_capacity(records.len());
    for record in records {
        if !known.insert(record.uuid.as_str()) {
            warn!(node_id = %record.uuid, db_id = record.id, "Duplicate record uuid, row skipped");
            continue;
        }
        kept.push(record);
    }

    let mut elements = Elements::new();
    for record in &kept {
        let kind = if record.use_input == ROOT_SENTINEL { NodeKind::Source } else { NodeKind::Action };
        let mut node = Node::new(&record.uuid, kind);
        node.data = NodeData {
            db_id: Some(record.id),
            title: record.node_name.clone(),
            prompt: record.prompt.clone(),
            background_prompt: record.background_prompt.clone(),
            input: record.input.clone(),
            sort: record.sort,
            ..NodeData::default()
        };
        elements.push(node);
    }

    for record in &kept {
        if record.use_input == ROOT_SENTINEL {
            continue;
        }
        if record.use_input == record.uuid {
            warn!(node_id = %record.uuid, "Record uses its own output as input, link dropped");
            continue;
        }
        if !known.contains(record.use_input.as_str()) {
            warn!(node_id = %record.uuid, use_input = %record.use_input, "Record points at unknown predecessor, link dropped");
            continue;
        }
        elements.push(Edge::new(&record.use_input, &record.uuid));
    }

    elements
}
