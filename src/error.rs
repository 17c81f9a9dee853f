use thiserror::Error;

/// 编辑器错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditorError {
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    #[error("node creation failed: {0}")]
    PersistenceFailure(String),

    #[error("edge {edge_id} references missing node {missing}")]
    DanglingReference { edge_id: String, missing: String },

    /// More than one node has no predecessor.
    #[error("workflow has {} root nodes: {}", .0.len(), .0.join(", "))]
    AmbiguousRoot(Vec<String>),

    #[error("workflow has no root node")]
    NoRoot,

    #[error("malformed element: {0}")]
    MalformedElement(String),

    #[error("another structural edit is still pending")]
    MutationInProgress,

    #[error("edit cancelled")]
    Cancelled,

    /// The element list was replaced while the edit was awaiting the server.
    #[error("edit superseded by a newer element list")]
    Superseded,

    #[error("workflow execution failed: {0}")]
    ExecutionFailure(String),
}

impl EditorError {
    pub fn node_not_found(id: impl Into<String>) -> Self {
        EditorError::NotFound { what: "node", id: id.into() }
    }
}

pub type EditorResult<T> = Result<T, EditorError>;
