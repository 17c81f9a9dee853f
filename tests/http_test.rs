use promptgraph::api::http::{HttpNodeStore, HttpWorkflowRunner};
use promptgraph::api::{CreateNodeRequest, NodeStore};
use promptgraph::error::EditorError;

fn request() -> CreateNodeRequest {
    CreateNodeRequest {
        uuid: "3f0e8f5c-1111-4c2b-9d55-000000000001".to_string(),
        use_input: "0".to_string(),
        prompt: String::new(),
        input: String::new(),
        background_prompt: String::new(),
        node_name: "New action".to_string(),
        ai_model: "gpt-4o-mini".to_string(),
        temperature: 0.7,
        sort: 2,
        company_id: 1,
        workflow_id: 1,
        user_id: 1,
    }
}

#[test]
fn test_endpoints() {
    assert_eq!(HttpNodeStore::new("http://localhost:8000/api/").endpoint(), "http://localhost:8000/api/nodes");
    assert_eq!(HttpWorkflowRunner::new("http://localhost:8000/api").endpoint(), "http://localhost:8000/api/workflows/run");
}

#[tokio::test]
async fn test_unreachable_server_is_a_persistence_failure() {
    // Port 9 (discard) is not expected to serve HTTP.
    let store = HttpNodeStore::new("http://127.0.0.1:9/api");
    let result = store.create_node(request()).await;
    assert!(matches!(result, Err(EditorError::PersistenceFailure(_))));
}

#[tokio::test]
#[ignore]
async fn test_create_node_against_httpbin() {
    // httpbin echoes the body back without an `id`, so decoding must fail cleanly.
    let store = HttpNodeStore::new("https://httpbin.org/anything");
    let result = store.create_node(request()).await;
    assert!(matches!(result, Err(EditorError::PersistenceFailure(msg)) if msg.contains("invalid response body")));
}
