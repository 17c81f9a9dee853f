use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::EditorResult;
use crate::prompt::PromptRecord;

pub mod http;
pub mod memory;

/// 当前打开的工作流所属的租户 / 工作流 / 用户
/// 显式传递，替代全局状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowContext {
    pub company_id: i64,
    pub workflow_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateNodeRequest {
    pub uuid: String,
    pub use_input: String,
    pub prompt: String,
    pub input: String,
    pub background_prompt: String,
    pub node_name: String,
    pub ai_model: String,
    pub temperature: f64,
    pub sort: i64,
    pub company_id: i64,
    pub workflow_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedNode {
    pub id: i64,
}

/// A persisted node row as the server returns it when a workflow is opened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: i64,
    pub uuid: String,
    pub use_input: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub background_prompt: String,
    #[serde(default)]
    pub node_name: String,
    #[serde(default)]
    pub sort: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub prompts: Vec<PromptRecord>,
    /// Initial input handed to the root prompt
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResponse {
    pub output: String,
}

/// 节点持久化接口：插入节点前先向服务端申请持久 id
#[async_trait]
pub trait NodeStore: Send + Sync {
    async fn create_node(&self, request: CreateNodeRequest) -> EditorResult<CreatedNode>;
}

/// 工作流执行接口
#[async_trait]
pub trait WorkflowRunner: Send + Sync {
    async fn run(&self, request: ExecutionRequest) -> EditorResult<ExecutionResponse>;
}
