//! Integration tests for single-task reads and writes

use std::time::Duration;

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use tasklink_core::domain::{DueDate, RemoteId, TaskStatus};
use tasklink_core::ports::{IRemoteTaskSource, NewRemoteTask, StatusLookup};
use tasklink_notion::NotionError;

use crate::common::{self, page_id, task_page};

fn id(n: u32) -> RemoteId {
    RemoteId::new(page_id(n)).unwrap()
}

#[tokio::test]
async fn test_status_lookup_found() {
    let (server, source) = common::setup_task_source().await;
    common::mount_page(&server, &page_id(1), task_page(1, "Task", None, "Done")).await;

    let status = source.get_task_status(&id(1)).await.unwrap();
    assert_eq!(status, StatusLookup::Found(TaskStatus::Done));
}

#[tokio::test]
async fn test_status_lookup_archived_is_not_found() {
    let (server, source) = common::setup_task_source().await;
    let mut page = task_page(1, "Task", None, "In progress");
    page["archived"] = json!(true);
    common::mount_page(&server, &page_id(1), page).await;

    let status = source.get_task_status(&id(1)).await.unwrap();
    assert_eq!(status, StatusLookup::NotFound);
}

#[tokio::test]
async fn test_status_lookup_404_is_not_found() {
    let (server, source) = common::setup_task_source().await;
    Mock::given(method("GET"))
        .and(path(format!("/pages/{}", page_id(1))))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "object": "error", "status": 404, "code": "object_not_found", "message": "Could not find page"
        })))
        .mount(&server)
        .await;

    let status = source.get_task_status(&id(1)).await.unwrap();
    assert_eq!(status, StatusLookup::NotFound);
}

#[tokio::test]
async fn test_status_lookup_server_error_propagates() {
    let (server, source) = common::setup_task_source().await;
    Mock::given(method("GET"))
        .and(path(format!("/pages/{}", page_id(1))))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    assert!(source.get_task_status(&id(1)).await.is_err());
}

#[tokio::test]
async fn test_create_task_sends_properties() {
    let (server, source) = common::setup_task_source().await;

    Mock::given(method("POST"))
        .and(path("/pages"))
        .and(body_partial_json(json!({
            "parent": { "database_id": common::DATABASE_ID },
            "properties": {
                "Request": { "title": [ { "text": { "content": "Call supplier" } } ] },
                "Assignee": { "people": [ { "id": common::USER_ID } ] },
                "Status": { "status": { "name": "New" } },
                "Due date": { "date": { "start": "2024-06-03" } }
            }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(task_page(7, "Call supplier", Some("2024-06-03"), "New")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let due = DueDate::parse("2024-06-03T15:30:00+00:00").unwrap();
    let created = source
        .create_task(&NewRemoteTask {
            title: "Call supplier".to_string(),
            due: Some(due),
        })
        .await
        .expect("create failed");

    assert_eq!(created.id, id(7));
    assert_eq!(created.title, "Call supplier");
    assert_eq!(created.status, TaskStatus::New);
    assert_eq!(created.url, format!("https://notion.so/{}", page_id(7)));
}

#[tokio::test]
async fn test_update_due_date_clear_sends_null() {
    let (server, source) = common::setup_task_source().await;

    Mock::given(method("PATCH"))
        .and(path(format!("/pages/{}", page_id(3))))
        .and(body_partial_json(json!({
            "properties": { "Due date": { "date": null } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_page(3, "T", None, "New")))
        .expect(1)
        .mount(&server)
        .await;

    source.update_due_date(&id(3), None).await.expect("update failed");
}

#[tokio::test]
async fn test_update_title_and_due() {
    let (server, source) = common::setup_task_source().await;

    Mock::given(method("PATCH"))
        .and(path(format!("/pages/{}", page_id(3))))
        .and(body_partial_json(json!({
            "properties": { "Request": { "title": [ { "text": { "content": "Renamed" } } ] } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_page(3, "Renamed", None, "New")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(format!("/pages/{}", page_id(3))))
        .and(body_partial_json(json!({
            "properties": { "Due date": { "date": { "start": "2024-07-01" } } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_page(3, "Renamed", Some("2024-07-01"), "New")))
        .expect(1)
        .mount(&server)
        .await;

    source.update_title(&id(3), "Renamed").await.expect("title failed");
    source
        .update_due_date(&id(3), NaiveDate::from_ymd_opt(2024, 7, 1))
        .await
        .expect("due failed");
}

#[tokio::test]
async fn test_mark_done_and_canceled() {
    let (server, source) = common::setup_task_source().await;

    Mock::given(method("PATCH"))
        .and(path(format!("/pages/{}", page_id(4))))
        .and(body_partial_json(json!({
            "properties": { "Status": { "status": { "name": "Done" } } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_page(4, "T", None, "Done")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(format!("/pages/{}", page_id(5))))
        .and(body_partial_json(json!({
            "properties": { "Status": { "status": { "name": "Canceled" } } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_page(5, "T", None, "Canceled")))
        .expect(1)
        .mount(&server)
        .await;

    source.mark_done(&id(4)).await.expect("mark_done failed");
    source.mark_canceled(&id(5)).await.expect("mark_canceled failed");
}

#[tokio::test]
async fn test_rate_limited_surfaces_retry_after() {
    let (server, client) = common::setup_notion_mock().await;

    Mock::given(method("GET"))
        .and(path(format!("/pages/{}", page_id(6))))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "7")
                .set_body_json(json!({
                    "object": "error", "status": 429, "code": "rate_limited", "message": "Slow down"
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client.get_page(&id(6)).await.unwrap_err();
    assert!(matches!(
        err,
        NotionError::RateLimited { retry_after: Some(d) } if d == Duration::from_secs(7)
    ));
}
