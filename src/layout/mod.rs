pub mod jitter;

use std::collections::{HashMap, HashSet};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{DfsEvent, depth_first_search};
use petgraph::Direction;
use tracing::{debug, warn};
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::graph::{Anchor, Edge, Element, Elements, Node};
use self::jitter::Jitter;

/// 布局结果
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOutcome {
    /// Same length and order as the input, positions overwritten
    pub elements: Elements,
    /// Edges left out of the layout graph, as `DanglingReference`
    pub skipped: Vec<EditorError>,
}

/// Splits edges into those whose endpoints both exist and the rest.
pub fn validate(elements: &Elements) -> (Vec<&Edge>, Vec<EditorError>) {
    let ids: HashSet<&str> = elements.nodes().map(|n| n.id.as_str()).collect();
    let mut valid = Vec::new();
    let mut skipped = Vec::new();

    for edge in elements.edges() {
        let missing = [&edge.source, &edge.target].into_iter().find(|id| !ids.contains(id.as_str()));
        match missing {
            Some(id) => skipped.push(EditorError::DanglingReference {
                edge_id: edge.id.clone(),
                missing: id.clone(),
            }),
            None => valid.push(edge),
        }
    }

    (valid, skipped)
}

fn size_of(node: &Node, config: &EditorConfig) -> (f64, f64) {
    (
        node.data.width.unwrap_or(config.node_width),
        node.data.height.unwrap_or(config.node_height),
    )
}

/// Rank of every vertex: longest path from any source.
/// Back edges found by a DFS are ignored so cycles still get a layout.
fn ranks(graph: &DiGraph<usize, ()>) -> HashMap<NodeIndex, usize> {
    let mut back_edges = HashSet::new();
    depth_first_search(graph, graph.node_indices(), |event| {
        if let DfsEvent::BackEdge(u, v) = event {
            back_edges.insert((u, v));
        }
    });

    let mut dag = graph.clone();
    dag.retain_edges(|g, e| match g.edge_endpoints(e) {
        Some(endpoints) => !back_edges.contains(&endpoints),
        None => false,
    });

    let order = toposort(&dag, None).unwrap_or_else(|_| dag.node_indices().collect());
    let mut rank: HashMap<NodeIndex, usize> = HashMap::new();
    for v in order {
        let r = dag.neighbors_directed(v, Direction::Incoming)
            .filter_map(|u| rank.get(&u).map(|r| r + 1))
            .max()
            .unwrap_or(0);
        rank.insert(v, r);
    }
    rank
}

/// Top-to-bottom ranked layout.
///
/// Each rank is a row; rows are stacked with `rank_sep` between them and the
/// nodes of a row are centred around x = 0 with `node_sep` between them, in
/// list order. Node positions are the top-left corner of the vertex box plus
/// a sub-pixel jitter on x. Edges get `Bottom` source and `Top` target anchors.
/// Dangling edges never reach the layout graph and are returned in `skipped`.
pub fn layout(elements: &Elements, config: &EditorConfig, jitter: &mut dyn Jitter) -> LayoutOutcome {
    let (valid, skipped) = validate(elements);
    for err in &skipped {
        warn!(error = %err, "Edge skipped by layout");
    }

    let nodes: Vec<&Node> = elements.nodes().collect();
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(nodes.len(), valid.len());
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();
    for (i, node) in nodes.iter().enumerate() {
        index.insert(node.id.as_str(), graph.add_node(i));
    }
    for edge in &valid {
        if let (Some(&s), Some(&t)) = (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
            graph.add_edge(s, t, ());
        }
    }

    let rank = ranks(&graph);
    let rank_count = rank.values().max().map(|r| r + 1).unwrap_or(0);
    let mut rows: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
    for (i, node) in nodes.iter().enumerate() {
        let r = index.get(node.id.as_str()).and_then(|v| rank.get(v)).copied().unwrap_or(0);
        rows[r].push(i);
    }

    // centre point of every node, by position in `nodes`
    let mut centres: Vec<(f64, f64)> = vec![(0.0, 0.0); nodes.len()];
    let mut top = 0.0;
    for row in &rows {
        let row_height = row.iter().map(|&i| size_of(nodes[i], config).1).fold(0.0, f64::max);
        let row_width: f64 = row.iter().map(|&i| size_of(nodes[i], config).0).sum::<f64>()
            + config.node_sep * row.len().saturating_sub(1) as f64;

        let mut left = -row_width / 2.0;
        for &i in row {
            let (w, _) = size_of(nodes[i], config);
            centres[i] = (left + w / 2.0, top + row_height / 2.0);
            left += w + config.node_sep;
        }
        top += row_height + config.rank_sep;
    }

    let mut positions: HashMap<&str, (f64, f64)> = HashMap::new();
    for (i, node) in nodes.iter().enumerate() {
        let (w, h) = size_of(node, config);
        let (cx, cy) = centres[i];
        let offset = jitter.next().clamp(0.0, config.max_jitter.max(0.0));
        positions.insert(node.id.as_str(), (cx - w / 2.0 + offset, cy - h / 2.0));
    }

    let laid_out: Elements = elements.iter()
        .map(|el| match el {
            Element::Node(node) => {
                let mut node = node.clone();
                if let Some(&(x, y)) = positions.get(node.id.as_str()) {
                    node.position.x = x;
                    node.position.y = y;
                }
                Element::Node(node)
            }
            Element::Edge(edge) if index.contains_key(edge.source.as_str()) && index.contains_key(edge.target.as_str()) => {
                let mut edge = edge.clone();
                edge.source_anchor = Some(Anchor::Bottom);
                edge.target_anchor = Some(Anchor::Top);
                Element::Edge(edge)
            }
            Element::Edge(edge) => Element::Edge(edge.clone()),
        })
        .collect();

    debug!(nodes = nodes.len(), ranks = rank_count, skipped = skipped.len(), "Layout computed");
    LayoutOutcome { elements: laid_out, skipped }
}
