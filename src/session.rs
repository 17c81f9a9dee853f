use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use crate::api::{ExecutionResponse, NodeStore, WorkflowContext, WorkflowRunner};
use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::graph::Elements;
use crate::graph::edit::{self, NewNode};
use crate::ids::{IdSource, UuidSource};
use crate::layout::{self, jitter::{Jitter, RandomJitter}};
use crate::prompt::{self, PromptRecord};

/// 用户对节点文本的编辑，None 表示不修改
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub title: Option<String>,
    pub prompt: Option<String>,
    pub background_prompt: Option<String>,
    pub input: Option<String>,
}

struct SessionState {
    elements: Elements,
    /// Bumped whenever the list is replaced wholesale
    generation: u64,
    jitter: Box<dyn Jitter>,
}

/// Held while a structural edit is in flight.
struct PendingGuard<'a>(&'a AtomicBool);

impl<'a> PendingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> EditorResult<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| PendingGuard(flag))
            .map_err(|_| EditorError::MutationInProgress)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// 一个打开的工作流的编辑会话
///
/// Owns the element list of one workflow. Structural edits (insert, delete)
/// are serialised: while one is pending, another fails with
/// `MutationInProgress`. Every successful edit re-runs the layout.
pub struct EditorSession {
    ctx: WorkflowContext,
    config: EditorConfig,
    store: Arc<dyn NodeStore>,
    ids: Arc<dyn IdSource>,
    state: Mutex<SessionState>,
    pending: AtomicBool,
    shutdown: CancellationToken,
}

impl EditorSession {
    pub fn new(ctx: WorkflowContext, config: EditorConfig, store: Arc<dyn NodeStore>) -> Self {
        let jitter = Box::new(RandomJitter::new(config.max_jitter));
        Self {
            ctx,
            config,
            store,
            ids: Arc::new(UuidSource),
            state: Mutex::new(SessionState {
                elements: Elements::new(),
                generation: 0,
                jitter,
            }),
            pending: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_jitter(mut self, jitter: Box<dyn Jitter>) -> Self {
        self.state.get_mut().jitter = jitter;
        self
    }

    /// Seeds the session with a loaded list, laid out.
    pub fn with_elements(mut self, elements: Elements) -> Self {
        let state = self.state.get_mut();
        let outcome = layout::layout(&elements, &self.config, state.jitter.as_mut());
        state.elements = outcome.elements;
        self
    }

    pub fn context(&self) -> &WorkflowContext {
        &self.ctx
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub async fn elements(&self) -> Elements {
        self.state.lock().await.elements.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn apply(&self, state: &mut SessionState, updated: Elements) -> Elements {
        let outcome = layout::layout(&updated, &self.config, state.jitter.as_mut());
        for err in &outcome.skipped {
            warn!(workflow_id = self.ctx.workflow_id, error = %err, "Dangling edge after edit");
        }
        state.elements = outcome.elements;
        state.elements.clone()
    }

    /// Inserts a node after `new_node.parent_id`.
    ///
    /// Waits for the server to hand out a durable id. If `cancel` fires or the
    /// session closes meanwhile, nothing is applied. A response that arrives
    /// after the list was replaced is dropped with `Superseded`.
    pub async fn insert_after(&self, new_node: NewNode, cancel: &CancellationToken) -> EditorResult<Elements> {
        let _guard = PendingGuard::acquire(&self.pending)?;
        if self.is_closed() {
            return Err(EditorError::Cancelled);
        }

        let (request, generation) = {
            let state = self.state.lock().await;
            let request = edit::prepare_insert(&state.elements, &new_node, &self.ctx, self.ids.as_ref(), &self.config)?;
            (request, state.generation)
        };

        debug!(parent = %new_node.parent_id, node_id = %request.uuid, sort = request.sort, "Requesting durable id");
        let created = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(node_id = %request.uuid, "Insert cancelled");
                return Err(EditorError::Cancelled);
            }
            _ = self.shutdown.cancelled() => {
                return Err(EditorError::Cancelled);
            }
            res = self.store.create_node(request.clone()) => res,
        };

        let created = created.map_err(|e| {
            error!(parent = %new_node.parent_id, error = %e, "Node creation failed, list unchanged");
            match e {
                EditorError::PersistenceFailure(_) => e,
                other => EditorError::PersistenceFailure(other.to_string()),
            }
        })?;

        let mut state = self.state.lock().await;
        if state.generation != generation || self.is_closed() {
            info!(node_id = %request.uuid, "Late response for a superseded list ignored");
            return Err(EditorError::Superseded);
        }

        let updated = edit::plan_insert(&state.elements, &new_node, &request, created.id, &self.config)?;
        info!(parent = %new_node.parent_id, node_id = %request.uuid, db_id = created.id, "Node inserted");
        Ok(self.apply(&mut state, updated))
    }

    pub async fn delete_node(&self, node_id: &str) -> EditorResult<Elements> {
        let _guard = PendingGuard::acquire(&self.pending)?;
        let mut state = self.state.lock().await;
        let updated = edit::delete_node(&state.elements, node_id)?;
        Ok(self.apply(&mut state, updated))
    }

    /// Edits a node's text in place. Not a structural edit, so it neither
    /// waits for nor supersedes a pending insert.
    pub async fn edit_node(&self, node_id: &str, patch: NodePatch) -> EditorResult<()> {
        let mut state = self.state.lock().await;
        let node = state.elements.node_mut(node_id)
            .ok_or_else(|| EditorError::node_not_found(node_id))?;

        if let Some(title) = patch.title {
            node.data.title = title;
        }
        if let Some(prompt) = patch.prompt {
            node.data.prompt = prompt;
        }
        if let Some(background) = patch.background_prompt {
            node.data.background_prompt = background;
        }
        if let Some(input) = patch.input {
            node.data.input = input;
        }
        Ok(())
    }

    /// Swaps in a freshly loaded list. Any insert still waiting on the server
    /// will be dropped when its response arrives.
    pub async fn replace_elements(&self, elements: Elements) -> Elements {
        let mut state = self.state.lock().await;
        state.generation += 1;
        self.apply(&mut state, elements)
    }

    /// Re-runs layout, returning the edges it had to skip.
    pub async fn relayout(&self) -> Vec<EditorError> {
        let mut state = self.state.lock().await;
        let SessionState { elements, jitter, .. } = &mut *state;
        let outcome = layout::layout(elements, &self.config, jitter.as_mut());
        *elements = outcome.elements;
        outcome.skipped
    }

    pub async fn prompts(&self) -> Vec<PromptRecord> {
        prompt::project(&self.state.lock().await.elements)
    }

    /// Submits the current chain for execution.
    /// Refuses to run without a unique root.
    pub async fn run(&self, runner: &dyn WorkflowRunner, input: Option<&str>) -> EditorResult<ExecutionResponse> {
        let request = {
            let state = self.state.lock().await;
            prompt::prepare_run(&state.elements, input)
        };
        let request = request.inspect_err(|e| {
            warn!(workflow_id = self.ctx.workflow_id, error = %e, "Execution blocked");
        })?;

        info!(workflow_id = self.ctx.workflow_id, prompts = request.prompts.len(), "Running workflow");
        runner.run(request).await
    }

    /// Ends the session: pending inserts are cancelled and the list dropped.
    pub async fn close(&self) {
        self.shutdown.cancel();
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.elements = Elements::new();
        info!(workflow_id = self.ctx.workflow_id, "Session closed");
    }
}
