use crate::graph::{Edge, Elements, Node, NodeKind, Position};

/// 链式构建元素列表，主要给测试和 CLI 示例用
pub struct ElementsBuilder {
    pub elements: Elements, // public for manual manipulation in tests
}

impl ElementsBuilder {
    pub fn new() -> Self {
        Self { elements: Elements::new() }
    }

    pub fn source(self, id: &str) -> NodeBuilder {
        self.node(id, NodeKind::Source)
    }

    pub fn action(self, id: &str) -> NodeBuilder {
        self.node(id, NodeKind::Action)
    }

    pub fn placeholder(self, id: &str) -> NodeBuilder {
        self.node(id, NodeKind::Placeholder)
    }

    pub fn node(self, id: &str, kind: NodeKind) -> NodeBuilder {
        NodeBuilder {
            elements_builder: self,
            node: Node::new(id, kind),
        }
    }

    pub fn connect(mut self, source: &str, target: &str) -> Self {
        self.elements.push(Edge::new(source, target));
        self
    }

    /// Adds nodes `ids` as actions and links them in order.
    pub fn chain(mut self, ids: &[&str]) -> Self {
        for (i, id) in ids.iter().enumerate() {
            self = self.action(id).sort(i as i64 + 1).done();
        }
        for pair in ids.windows(2) {
            self = self.connect(pair[0], pair[1]);
        }
        self
    }

    pub fn build(self) -> Elements {
        self.elements
    }
}

impl Default for ElementsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct NodeBuilder {
    elements_builder: ElementsBuilder,
    node: Node,
}

impl NodeBuilder {
    pub fn title(mut self, title: &str) -> Self {
        self.node.data.title = title.to_string();
        self
    }

    pub fn prompt(mut self, prompt: &str) -> Self {
        self.node.data.prompt = prompt.to_string();
        self
    }

    pub fn background_prompt(mut self, text: &str) -> Self {
        self.node.data.background_prompt = text.to_string();
        self
    }

    pub fn input(mut self, input: &str) -> Self {
        self.node.data.input = input.to_string();
        self
    }

    pub fn sort(mut self, sort: i64) -> Self {
        self.node.data.sort = Some(sort);
        self
    }

    pub fn db_id(mut self, id: i64) -> Self {
        self.node.data.db_id = Some(id);
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.node.data.width = Some(width);
        self.node.data.height = Some(height);
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.node.position = Position::new(x, y);
        self
    }

    pub fn done(mut self) -> ElementsBuilder {
        self.elements_builder.elements.push(self.node);
        self.elements_builder
    }
}
