use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;
use crate::api::{CreateNodeRequest, CreatedNode, ExecutionRequest, ExecutionResponse, NodeRecord, NodeStore, WorkflowRunner};
use crate::error::{EditorError, EditorResult};
use crate::prompt;

/// 内存实现，离线模式和测试使用
pub struct InMemoryNodeStore {
    // Map<uuid, row>
    rows: DashMap<String, NodeRecord>,
    next_id: AtomicI64,
    failing: AtomicBool,
    delay: Option<Duration>,
}

impl InMemoryNodeStore {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI64::new(1),
            failing: AtomicBool::new(false),
            delay: None,
        }
    }

    /// Simulates network latency on every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// When set, every create call is rejected
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn get(&self, uuid: &str) -> Option<NodeRecord> {
        self.rows.get(uuid).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for InMemoryNodeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeStore for InMemoryNodeStore {
    async fn create_node(&self, request: CreateNodeRequest) -> EditorResult<CreatedNode> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(EditorError::PersistenceFailure("store unavailable".to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.rows.insert(request.uuid.clone(), NodeRecord {
            id,
            uuid: request.uuid,
            use_input: request.use_input,
            prompt: request.prompt,
            input: request.input,
            background_prompt: request.background_prompt,
            node_name: request.node_name,
            sort: Some(request.sort),
        });
        Ok(CreatedNode { id })
    }
}

/// Walks the chain from the root and echoes each prompt, one line per step.
#[derive(Debug, Default)]
pub struct EchoRunner;

#[async_trait]
impl WorkflowRunner for EchoRunner {
    async fn run(&self, request: ExecutionRequest) -> EditorResult<ExecutionResponse> {
        let ordered = prompt::ordered(&request.prompts)?;
        let mut lines = vec![request.input];
        for record in ordered {
            lines.push(format!("[{}] {}", record.id, record.prompt));
        }
        Ok(ExecutionResponse { output: lines.join("\n") })
    }
}
