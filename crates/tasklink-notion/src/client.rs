//! Notion API client
//!
//! Provides a typed HTTP client for the Notion REST API. Handles the
//! bearer token and `Notion-Version` headers, JSON (de)serialization,
//! and mapping of error responses onto [`NotionError`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tasklink_notion::client::NotionClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = NotionClient::new("secret_token");
//! let me = client.get_me().await?;
//! println!("Connected as {}", me.display_name());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use tasklink_core::domain::RemoteId;

use crate::pages::{PageObject, QueryResponse};
use crate::users::{NotionUser, UserList};
use crate::NotionError;

/// Base URL for the Notion API v1
pub const NOTION_BASE_URL: &str = "https://api.notion.com/v1";

/// API version pinned by this client
pub const NOTION_API_VERSION: &str = "2022-06-28";

/// Error body returned by the Notion API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

// ============================================================================
// NotionClient
// ============================================================================

/// HTTP client for Notion API calls
pub struct NotionClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_version: String,
}

impl NotionClient {
    /// Creates a client for the public Notion API
    ///
    /// # Arguments
    /// * `api_key` - Internal integration token
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, NOTION_BASE_URL)
    }

    /// Creates a client with a custom base URL (useful for testing)
    ///
    /// # Arguments
    /// * `api_key` - Internal integration token
    /// * `base_url` - Base URL without trailing slash, e.g. `http://127.0.0.1:1234`
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_version: NOTION_API_VERSION.to_string(),
        }
    }

    /// Overrides the `Notion-Version` header
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates an authenticated request builder for the given method and path
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to the base URL (e.g. "/users/me")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", &self.api_version)
    }

    /// Sends a request and decodes a successful JSON response
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, NotionError> {
        let response = builder.send().await?;
        let response = check_status(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| NotionError::InvalidResponse(e.to_string()))
    }

    // ========================================================================
    // Databases
    // ========================================================================

    /// Runs one page of a database query
    ///
    /// `body` carries the filter, `page_size` and optional `start_cursor`;
    /// see [`crate::query`]. Callers follow `next_cursor` themselves.
    pub async fn query_database(
        &self,
        database_id: &RemoteId,
        body: &Value,
    ) -> Result<QueryResponse, NotionError> {
        let path = format!("/databases/{}/query", database_id.as_str());
        debug!(database_id = %database_id, "Querying database");
        self.send(self.request(Method::POST, &path).json(body))
            .await
    }

    // ========================================================================
    // Pages
    // ========================================================================

    /// Retrieves a page by id
    pub async fn get_page(&self, id: &RemoteId) -> Result<PageObject, NotionError> {
        let path = format!("/pages/{}", id.as_str());
        self.send(self.request(Method::GET, &path)).await
    }

    /// Patches page properties
    ///
    /// # Arguments
    /// * `id` - Page to update
    /// * `properties` - Object of property name to property value
    pub async fn update_page(
        &self,
        id: &RemoteId,
        properties: Value,
    ) -> Result<PageObject, NotionError> {
        let path = format!("/pages/{}", id.as_str());
        let body = serde_json::json!({ "properties": properties });
        self.send(self.request(Method::PATCH, &path).json(&body))
            .await
    }

    /// Creates a page in a database
    ///
    /// # Arguments
    /// * `database_id` - Parent database
    /// * `properties` - Object of property name to property value
    pub async fn create_page(
        &self,
        database_id: &RemoteId,
        properties: Value,
    ) -> Result<PageObject, NotionError> {
        let body = serde_json::json!({
            "parent": { "database_id": database_id.as_str() },
            "properties": properties,
        });
        self.send(self.request(Method::POST, "/pages").json(&body))
            .await
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Retrieves the bot user behind the integration token
    pub async fn get_me(&self) -> Result<NotionUser, NotionError> {
        self.send(self.request(Method::GET, "/users/me")).await
    }

    /// Lists every user visible to the integration, following pagination
    pub async fn list_users(&self) -> Result<Vec<NotionUser>, NotionError> {
        let mut users = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut builder = self
                .request(Method::GET, "/users")
                .query(&[("page_size", "100")]);
            if let Some(ref c) = cursor {
                builder = builder.query(&[("start_cursor", c.as_str())]);
            }

            let page: UserList = self.send(builder).await?;
            users.extend(page.results);

            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        debug!(count = users.len(), "Listed workspace users");
        Ok(users)
    }
}

// ============================================================================
// Response status mapping
// ============================================================================

/// Maps a non-success response onto a [`NotionError`]
async fn check_status(response: Response) -> Result<Response, NotionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after);

    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or(ErrorBody {
        code: String::new(),
        message: text.clone(),
    });

    warn!(
        status = status.as_u16(),
        code = %body.code,
        message = %body.message,
        "Notion API request failed"
    );

    Err(match status {
        StatusCode::UNAUTHORIZED => NotionError::Unauthorized(body.message),
        StatusCode::FORBIDDEN => NotionError::Forbidden(body.message),
        StatusCode::NOT_FOUND => NotionError::NotFound(body.message),
        StatusCode::TOO_MANY_REQUESTS => NotionError::RateLimited { retry_after },
        _ => NotionError::Api {
            status: status.as_u16(),
            code: body.code,
            message: body.message,
        },
    })
}

/// Parses a `Retry-After` header holding a number of seconds
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
