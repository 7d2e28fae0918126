//! Shared test helpers for Notion API integration tests
//!
//! Provides wiremock-based mock server setup and page fixtures. Each
//! helper returns a client or task source pointing at the mock server.

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tasklink_core::config::PropertyNames;
use tasklink_core::domain::{RemoteId, StatusNames};
use tasklink_notion::client::NotionClient;
use tasklink_notion::pages::PageParser;
use tasklink_notion::provider::NotionTaskSource;

pub const DATABASE_ID: &str = "aaaaaaaabbbbccccddddeeeeeeeeeeee";
pub const USER_ID: &str = "user-test-001";

/// Starts a mock server and returns a client pointing at it
pub async fn setup_notion_mock() -> (MockServer, NotionClient) {
    let server = MockServer::start().await;
    let client = NotionClient::with_base_url("secret_test", server.uri());
    (server, client)
}

/// Starts a mock server and returns a task source pointing at it
pub async fn setup_task_source() -> (MockServer, NotionTaskSource) {
    let (server, client) = setup_notion_mock().await;
    let source = NotionTaskSource::new(
        client,
        PageParser::new(PropertyNames::default(), StatusNames::default()),
        RemoteId::new(DATABASE_ID).unwrap(),
        USER_ID,
    )
    .with_type_exclude(Some("Onboarding".to_string()));
    (server, source)
}

/// Builds a 32-hex page id from a small number
pub fn page_id(n: u32) -> String {
    format!("{n:032x}")
}

/// A task page in the default property layout
pub fn task_page(n: u32, title: &str, due: Option<&str>, status: &str) -> Value {
    json!({
        "object": "page",
        "id": page_id(n),
        "url": format!("https://www.notion.so/{}", page_id(n)),
        "archived": false,
        "last_edited_time": "2024-04-01T09:00:00.000Z",
        "properties": {
            "Request": { "type": "title", "title": [ { "plain_text": title } ] },
            "Due date": { "type": "date", "date": due.map(|d| json!({ "start": d })) },
            "Status": { "type": "status", "status": { "name": status } },
            "Customer": { "type": "relation", "relation": [] }
        }
    })
}

/// Mounts `GET /pages/{id}` returning `body`
pub async fn mount_page(server: &MockServer, id: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/pages/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Path of the database query endpoint
pub fn query_path() -> String {
    format!("/databases/{DATABASE_ID}/query")
}
