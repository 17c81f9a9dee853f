pub mod builder;
pub mod classify;
pub mod edit;
pub mod records;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub type NodeId = String;
pub type EdgeId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// The chain's entry step
    Source,
    Action,
    /// Empty slot shown before the user picks a step
    Placeholder,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

/// UI 回调引用，核心只负责透传
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeCallbacks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_add: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_edit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_select: Option<String>,
}

impl NodeCallbacks {
    pub fn is_empty(&self) -> bool {
        self.on_add.is_none() && self.on_delete.is_none() && self.on_edit.is_none() && self.on_select.is_none()
    }
}

/// 节点配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeData {
    /// Durable id assigned by the server
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub db_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub background_prompt: String,
    #[serde(default)]
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "NodeCallbacks::is_empty")]
    pub callbacks: NodeCallbacks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub position: Position,
    pub data: NodeData,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            position: Position::default(),
            data: NodeData::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Top,
    Bottom,
}

/// 有向边：target 消费 source 的输出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "sourceHandle", default, skip_serializing_if = "Option::is_none")]
    pub source_anchor: Option<Anchor>,
    #[serde(rename = "targetHandle", default, skip_serializing_if = "Option::is_none")]
    pub target_anchor: Option<Anchor>,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: edge_id(&source, &target),
            source,
            target,
            source_anchor: None,
            target_anchor: None,
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

pub fn edge_id(source: &str, target: &str) -> EdgeId {
    format!("e{}-{}", source, target)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Element {
    Node(Node),
    Edge(Edge),
}

impl Element {
    pub fn is_node(&self) -> bool {
        matches!(self, Element::Node(_))
    }

    pub fn is_edge(&self) -> bool {
        matches!(self, Element::Edge(_))
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Element::Node(n) => Some(n),
            Element::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            Element::Edge(e) => Some(e),
            Element::Node(_) => None,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Element::Node(n) => &n.id,
            Element::Edge(e) => &e.id,
        }
    }

    /// Whether this element is, or points at, the given node
    pub fn references(&self, node_id: &str) -> bool {
        match self {
            Element::Node(n) => n.id == node_id,
            Element::Edge(e) => e.touches(node_id),
        }
    }
}

impl From<Node> for Element {
    fn from(node: Node) -> Self {
        Element::Node(node)
    }
}

impl From<Edge> for Element {
    fn from(edge: Edge) -> Self {
        Element::Edge(edge)
    }
}

// Persisted lists carry no discriminant, so go through the classifier.
impl<'de> Deserialize<'de> for Element {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        classify::classify(&raw).map_err(serde::de::Error::custom)
    }
}

/// 一个工作流的元素列表 (节点 + 边，保持插入顺序)
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Elements(Vec<Element>);

impl<'de> Deserialize<'de> for Elements {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        classify::classify_all(&raw).map_err(serde::de::Error::custom)
    }
}

impl Elements {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.0.iter()
    }

    pub fn push(&mut self, element: impl Into<Element>) {
        self.0.push(element.into());
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.0.iter().filter_map(Element::as_node)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.0.iter().filter_map(Element::as_edge)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.0.iter_mut().find_map(|el| match el {
            Element::Node(n) if n.id == id => Some(n),
            _ => None,
        })
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges().filter(move |e| e.source == id)
    }

    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges().filter(move |e| e.target == id)
    }

    pub fn max_sort(&self) -> Option<i64> {
        self.nodes().filter_map(|n| n.data.sort).max()
    }

    /// Number of elements that are or point at `id`
    pub fn references(&self, id: &str) -> usize {
        self.0.iter().filter(|el| el.references(id)).count()
    }
}

impl From<Vec<Element>> for Elements {
    fn from(elements: Vec<Element>) -> Self {
        Self(elements)
    }
}

impl FromIterator<Element> for Elements {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Elements {
    type Item = Element;
    type IntoIter = std::vec::IntoIter<Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Elements {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
