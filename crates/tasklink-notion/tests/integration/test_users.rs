//! Integration tests for the users endpoints

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use tasklink_notion::users::Directory;

use crate::common;

#[tokio::test]
async fn test_get_me_returns_bot() {
    let (server, client) = common::setup_notion_mock().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "user", "id": "bot-1", "type": "bot", "name": "Task sync", "bot": {}
        })))
        .mount(&server)
        .await;

    let me = client.get_me().await.expect("get_me failed");
    assert_eq!(me.display_name(), "Task sync");
    assert!(me.is_bot());
}

#[tokio::test]
async fn test_directory_lists_all_user_pages() {
    let (server, client) = common::setup_notion_mock().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "bot-1", "type": "bot", "name": "Task sync"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("start_cursor", "next-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "id": "bot-2", "type": "bot", "name": "Importer" }
            ],
            "has_more": false,
            "next_cursor": null
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "id": "p-1", "type": "person", "name": "Avery", "person": { "email": "avery@example.com" } }
            ],
            "has_more": true,
            "next_cursor": "next-1"
        })))
        .mount(&server)
        .await;

    let directory = Directory::fetch(&client).await.expect("fetch failed");
    assert_eq!(directory.me.id, "bot-1");
    assert_eq!(directory.users.len(), 2);

    let people: Vec<_> = directory.people().collect();
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].email(), Some("avery@example.com"));
}
