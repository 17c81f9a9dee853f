use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use crate::api::{CreateNodeRequest, CreatedNode, ExecutionRequest, ExecutionResponse, NodeStore, WorkflowRunner};
use crate::error::{EditorError, EditorResult};

#[derive(Debug, Clone)]
pub struct HttpNodeStore {
    client: Client,
    base_url: String,
}

impl HttpNodeStore {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/nodes", self.base_url)
    }
}

#[async_trait]
impl NodeStore for HttpNodeStore {
    async fn create_node(&self, request: CreateNodeRequest) -> EditorResult<CreatedNode> {
        let url = self.endpoint();
        debug!(url = %url, uuid = %request.uuid, "Creating node");

        let response = self.client.post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EditorError::PersistenceFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Node creation rejected");
            return Err(EditorError::PersistenceFailure(format!("server returned {}", status)));
        }

        response.json::<CreatedNode>()
            .await
            .map_err(|e| EditorError::PersistenceFailure(format!("invalid response body: {}", e)))
    }
}

#[derive(Debug, Clone)]
pub struct HttpWorkflowRunner {
    client: Client,
    base_url: String,
}

impl HttpWorkflowRunner {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/workflows/run", self.base_url)
    }
}

#[async_trait]
impl WorkflowRunner for HttpWorkflowRunner {
    async fn run(&self, request: ExecutionRequest) -> EditorResult<ExecutionResponse> {
        let url = self.endpoint();
        debug!(url = %url, prompts = request.prompts.len(), "Running workflow");

        let response = self.client.post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EditorError::ExecutionFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EditorError::ExecutionFailure(format!("server returned {}", status)));
        }

        response.json::<ExecutionResponse>()
            .await
            .map_err(|e| EditorError::ExecutionFailure(format!("invalid response body: {}", e)))
    }
}
