use tracing::{debug, info, warn};
use crate::api::{CreateNodeRequest, NodeStore, WorkflowContext};
use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::graph::{Edge, Element, Elements, Node, NodeCallbacks, NodeData, NodeId, NodeKind};
use crate::ids::IdSource;

/// 插入请求：在 parent 之后插入一个新节点
#[derive(Debug, Clone, PartialEq)]
pub struct NewNode {
    pub parent_id: NodeId,
    pub kind: NodeKind,
    /// Attached to the new node untouched
    pub callbacks: NodeCallbacks,
}

impl NewNode {
    pub fn new(parent_id: &str, kind: NodeKind) -> Self {
        Self {
            parent_id: parent_id.to_string(),
            kind,
            callbacks: NodeCallbacks::default(),
        }
    }

    pub fn with_callbacks(mut self, callbacks: NodeCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }
}

/// The next free sort value, never below 2.
pub fn next_sort(elements: &Elements) -> i64 {
    elements.max_sort().unwrap_or(1).max(1) + 1
}

fn default_title(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Source => "New source",
        NodeKind::Action => "New action",
        NodeKind::Placeholder => "New step",
    }
}

/// Builds the node-creation request for an insert, checking the parent first.
pub fn prepare_insert(
    elements: &Elements,
    new_node: &NewNode,
    ctx: &WorkflowContext,
    ids: &dyn IdSource,
    config: &EditorConfig,
) -> EditorResult<CreateNodeRequest> {
    if !elements.contains_node(&new_node.parent_id) {
        return Err(EditorError::node_not_found(&new_node.parent_id));
    }

    Ok(CreateNodeRequest {
        uuid: ids.next_id(),
        use_input: new_node.parent_id.clone(),
        prompt: String::new(),
        input: String::new(),
        background_prompt: String::new(),
        node_name: default_title(new_node.kind).to_string(),
        ai_model: config.ai_model.clone(),
        temperature: config.temperature,
        sort: next_sort(elements),
        company_id: ctx.company_id,
        workflow_id: ctx.workflow_id,
        user_id: ctx.user_id,
    })
}

/// Splices an already persisted node in after its parent.
/// The parent keeps exactly one outgoing edge; its former child, if any,
/// now hangs off the new node.
pub fn plan_insert(
    elements: &Elements,
    new_node: &NewNode,
    request: &CreateNodeRequest,
    db_id: i64,
    config: &EditorConfig,
) -> EditorResult<Elements> {
    let parent = elements.node(&new_node.parent_id)
        .ok_or_else(|| EditorError::node_not_found(&new_node.parent_id))?;

    let existing_child = elements.outgoing(&parent.id).next().map(|e| e.target.clone());
    let (dx, dy) = config.insert_offset;

    let node = Node {
        id: request.uuid.clone(),
        kind: new_node.kind,
        position: parent.position.offset(dx, dy),
        data: NodeData {
            db_id: Some(db_id),
            title: request.node_name.clone(),
            sort: Some(request.sort),
            callbacks: new_node.callbacks.clone(),
            ..NodeData::default()
        },
    };

    let parent_id = parent.id.clone();
    let mut updated: Elements = elements.iter()
        .filter(|el| !matches!(el, Element::Edge(e) if e.source == parent_id))
        .cloned()
        .collect();

    let node_id = node.id.clone();
    updated.push(node);
    updated.push(Edge::new(&parent_id, &node_id));
    if let Some(child) = existing_child {
        updated.push(Edge::new(&node_id, &child));
    }

    debug!(parent = %parent_id, node_id = %node_id, "Node spliced into chain");
    Ok(updated)
}

/// Inserts a new node after `new_node.parent_id`.
///
/// A durable id is requested from `store` first; if that fails nothing is
/// applied. The input list is never modified, callers replace their copy
/// with the returned one.
pub async fn insert_after(
    elements: &Elements,
    new_node: &NewNode,
    ctx: &WorkflowContext,
    store: &dyn NodeStore,
    ids: &dyn IdSource,
    config: &EditorConfig,
) -> EditorResult<Elements> {
    let request = prepare_insert(elements, new_node, ctx, ids, config)?;
    let created = store.create_node(request.clone()).await.map_err(|e| {
        warn!(parent = %new_node.parent_id, error = %e, "Node creation failed");
        match e {
            EditorError::PersistenceFailure(_) => e,
            other => EditorError::PersistenceFailure(other.to_string()),
        }
    })?;

    info!(parent = %new_node.parent_id, node_id = %request.uuid, db_id = created.id, "Node created");
    plan_insert(elements, new_node, &request, created.id, config)
}

/// 删除节点，并把前驱直接连到后继
pub fn delete_node(elements: &Elements, node_id: &str) -> EditorResult<Elements> {
    if !elements.contains_node(node_id) {
        return Err(EditorError::node_not_found(node_id));
    }

    let incoming: Vec<Edge> = elements.incoming(node_id).cloned().collect();
    let outgoing: Vec<Edge> = elements.outgoing(node_id).cloned().collect();

    let mut updated: Elements = elements.iter()
        .filter(|el| !el.references(node_id))
        .cloned()
        .collect();

    if let Some(next) = outgoing.first() {
        for mut edge in incoming {
            // A two-node cycle would collapse into a self loop.
            if edge.source == next.target {
                continue;
            }
            let duplicate = updated.edges().any(|e| e.source == edge.source && e.target == next.target);
            if duplicate {
                continue;
            }
            edge.target = next.target.clone();
            updated.push(edge);
        }
    }

    info!(node_id = %node_id, remaining = updated.len(), "Node deleted");
    Ok(updated)
}
