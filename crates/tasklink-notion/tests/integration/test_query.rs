//! Integration tests for listing the active task set

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use tasklink_core::domain::TaskStatus;
use tasklink_core::ports::IRemoteTaskSource;

use crate::common::{self, page_id, task_page};

#[tokio::test]
async fn test_list_follows_pagination() {
    let (server, source) = common::setup_task_source().await;

    Mock::given(method("POST"))
        .and(path(common::query_path()))
        .and(body_partial_json(json!({ "start_cursor": "cursor-2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [ task_page(2, "Second", None, "In progress") ],
            "has_more": false,
            "next_cursor": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(common::query_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [ task_page(1, "First", Some("2024-05-01"), "New") ],
            "has_more": true,
            "next_cursor": "cursor-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = source.list_active_tasks().await.expect("list failed");

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "First");
    assert_eq!(tasks[0].status, TaskStatus::New);
    assert_eq!(tasks[0].due.unwrap().to_string(), "2024-05-01");
    assert_eq!(tasks[1].title, "Second");
    assert_eq!(tasks[1].status, TaskStatus::Active("In progress".to_string()));
}

#[tokio::test]
async fn test_list_sends_filter_and_headers() {
    let (server, source) = common::setup_task_source().await;

    Mock::given(method("POST"))
        .and(path(common::query_path()))
        .and(header("Authorization", "Bearer secret_test"))
        .and(header("Notion-Version", "2022-06-28"))
        .and(body_partial_json(json!({
            "page_size": 100,
            "filter": { "and": [
                { "property": "Assignee", "people": { "contains": common::USER_ID } },
                { "property": "Status", "status": { "does_not_equal": "Done" } },
                { "property": "Status", "status": { "does_not_equal": "Canceled" } },
                { "property": "Type", "select": { "does_not_equal": "Onboarding" } }
            ]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [],
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = source.list_active_tasks().await.expect("list failed");
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn test_list_skips_unreadable_pages() {
    let (server, source) = common::setup_task_source().await;

    Mock::given(method("POST"))
        .and(path(common::query_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                task_page(1, "Good", None, "New"),
                task_page(2, "Bad due", Some("next week"), "New")
            ],
            "has_more": false
        })))
        .mount(&server)
        .await;

    let tasks = source.list_active_tasks().await.expect("list failed");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Good");
}

#[tokio::test]
async fn test_list_resolves_customer_once() {
    let (server, source) = common::setup_task_source().await;
    let customer_id = page_id(900);

    let mut first = task_page(1, "One", None, "New");
    first["properties"]["Customer"]["relation"] = json!([ { "id": customer_id } ]);
    let mut second = task_page(2, "Two", None, "New");
    second["properties"]["Customer"]["relation"] = json!([ { "id": customer_id } ]);

    Mock::given(method("POST"))
        .and(path(common::query_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [ first, second ],
            "has_more": false
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/pages/{customer_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": customer_id,
            "properties": {
                "Company": { "type": "title", "title": [ { "plain_text": "Acme" } ] }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = source.list_active_tasks().await.expect("list failed");
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|t| t.customer.as_deref() == Some("Acme")));
}

#[tokio::test]
async fn test_list_customer_failure_is_not_fatal() {
    let (server, source) = common::setup_task_source().await;
    let customer_id = page_id(901);

    let mut page = task_page(1, "One", None, "New");
    page["properties"]["Customer"]["relation"] = json!([ { "id": customer_id } ]);

    Mock::given(method("POST"))
        .and(path(common::query_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [ page ],
            "has_more": false
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/pages/{customer_id}")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "object": "error", "status": 500, "code": "internal_server_error", "message": "boom"
        })))
        .mount(&server)
        .await;

    let tasks = source.list_active_tasks().await.expect("list failed");
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].customer.is_none());
}

#[tokio::test]
async fn test_list_unauthorized_is_error() {
    let (server, source) = common::setup_task_source().await;

    Mock::given(method("POST"))
        .and(path(common::query_path()))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "object": "error", "status": 401, "code": "unauthorized", "message": "API token is invalid."
        })))
        .mount(&server)
        .await;

    let err = source.list_active_tasks().await.unwrap_err();
    let notion = err.downcast_ref::<tasklink_notion::NotionError>().expect("NotionError");
    assert!(matches!(notion, tasklink_notion::NotionError::Unauthorized(_)));
}
