//! NotionTaskSource - IRemoteTaskSource implementation for a Notion database
//!
//! Wraps the [`NotionClient`] and the [`PageParser`] to fulfil the
//! [`IRemoteTaskSource`] port contract.
//!
//! ## Design Notes
//!
//! - The active set is filtered server-side (see [`crate::query`]).
//! - A page that cannot be parsed is skipped with a warning instead of
//!   failing the whole listing.
//! - Customer names live on related pages. They are fetched once per
//!   customer and cached for the lifetime of the source; a failed lookup
//!   leaves the customer empty.

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use tasklink_core::config::Config;
use tasklink_core::domain::{due_day, RemoteId, RemoteTask, TaskStatus};
use tasklink_core::ports::{IRemoteTaskSource, NewRemoteTask, StatusLookup};

use crate::client::NotionClient;
use crate::pages::{PageObject, PageParser};
use crate::query;

/// Remote task source backed by a Notion database
pub struct NotionTaskSource {
    client: NotionClient,
    parser: PageParser,
    database_id: RemoteId,
    user_id: String,
    type_exclude: Option<String>,
    customers: Mutex<HashMap<RemoteId, Option<String>>>,
}

impl NotionTaskSource {
    /// Creates a source for one database and assignee
    ///
    /// # Arguments
    /// * `client` - Authenticated API client
    /// * `parser` - Property mapping for the database
    /// * `database_id` - Database holding the tasks
    /// * `user_id` - Assignee whose tasks are synchronized
    pub fn new(
        client: NotionClient,
        parser: PageParser,
        database_id: RemoteId,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            parser,
            database_id,
            user_id: user_id.into(),
            type_exclude: None,
            customers: Mutex::new(HashMap::new()),
        }
    }

    /// Excludes tasks whose type equals `task_type`
    pub fn with_type_exclude(mut self, task_type: Option<String>) -> Self {
        self.type_exclude = task_type.filter(|t| !t.is_empty());
        self
    }

    /// Builds a source from the loaded configuration
    ///
    /// # Errors
    /// Fails if `notion.database_id` is not a valid page or database id.
    pub fn from_config(config: &Config) -> Result<Self> {
        let database_id = RemoteId::new(&config.notion.database_id)
            .context("notion.database_id is not a valid Notion id")?;
        let client = NotionClient::with_base_url(&config.notion.api_key, &config.notion.api_base_url)
            .with_api_version(&config.notion.api_version);
        let parser = PageParser::new(config.properties.clone(), config.statuses.clone());

        Ok(Self::new(client, parser, database_id, &config.notion.user_id)
            .with_type_exclude(config.filter.type_exclude.clone()))
    }

    /// Returns the underlying client
    pub fn client(&self) -> &NotionClient {
        &self.client
    }

    /// Resolves the customer name of a task page, using the cache
    async fn customer_for(&self, page: &PageObject) -> Option<String> {
        let customer_id = self.parser.customer_id(page)?;

        if let Some(cached) = self.customers.lock().await.get(&customer_id) {
            return cached.clone();
        }

        let name = match self.client.get_page(&customer_id).await {
            Ok(customer) => customer.any_title(),
            Err(e) => {
                warn!(customer_id = %customer_id, error = %e, "Failed to resolve customer");
                None
            }
        };

        self.customers
            .lock()
            .await
            .insert(customer_id, name.clone());
        name
    }

    async fn patch(&self, id: &RemoteId, properties: serde_json::Value, what: &str) -> Result<()> {
        self.client
            .update_page(id, properties)
            .await
            .with_context(|| format!("Failed to update {what} of task {id}"))?;
        debug!(task_id = %id, field = what, "Updated remote task");
        Ok(())
    }
}

#[async_trait::async_trait]
impl IRemoteTaskSource for NotionTaskSource {
    async fn list_active_tasks(&self) -> Result<Vec<RemoteTask>> {
        let filter = query::active_tasks_filter(
            self.parser.properties(),
            self.parser.statuses(),
            &self.user_id,
            self.type_exclude.as_deref(),
        );

        let mut tasks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let body = query::query_body(&filter, cursor.as_deref());
            let response = self
                .client
                .query_database(&self.database_id, &body)
                .await
                .context("Failed to query task database")?;

            for page in &response.results {
                let customer = self.customer_for(page).await;
                match self.parser.parse(page, customer) {
                    Ok(task) => tasks.push(task),
                    Err(e) => warn!(page_id = %page.id, error = %e, "Skipping unreadable task"),
                }
            }

            match (response.has_more, response.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        info!(count = tasks.len(), "Fetched active remote tasks");
        Ok(tasks)
    }

    async fn get_task_status(&self, id: &RemoteId) -> Result<StatusLookup> {
        match self.client.get_page(id).await {
            Ok(page) if page.is_gone() => Ok(StatusLookup::NotFound),
            Ok(page) => Ok(StatusLookup::Found(self.parser.status(&page))),
            Err(e) if e.is_not_found() => Ok(StatusLookup::NotFound),
            Err(e) => Err(e).with_context(|| format!("Failed to look up task {id}")),
        }
    }

    async fn create_task(&self, task: &NewRemoteTask) -> Result<RemoteTask> {
        let properties =
            self.parser
                .new_task_properties(&task.title, due_day(task.due.as_ref()), &self.user_id);

        let page = self
            .client
            .create_page(&self.database_id, properties)
            .await
            .with_context(|| format!("Failed to create task '{}'", task.title))?;

        let id = RemoteId::new(&page.id).context("Created page has an invalid id")?;
        let mut created = self.parser.parse(&page, None).unwrap_or_else(|e| {
            warn!(page_id = %page.id, error = %e, "Created page is unreadable, using request values");
            RemoteTask {
                id: id.clone(),
                title: task.title.clone(),
                due: task.due,
                status: TaskStatus::New,
                last_modified: None,
                customer: None,
                url: String::new(),
            }
        });
        created.url = RemoteTask::default_url(&id);

        info!(task_id = %id, title = %created.title, "Created remote task");
        Ok(created)
    }

    async fn update_title(&self, id: &RemoteId, title: &str) -> Result<()> {
        self.patch(id, self.parser.title_value(title), "title").await
    }

    async fn update_due_date(&self, id: &RemoteId, due: Option<NaiveDate>) -> Result<()> {
        self.patch(id, self.parser.due_value(due), "due date").await
    }

    async fn mark_done(&self, id: &RemoteId) -> Result<()> {
        self.patch(id, self.parser.status_value(&TaskStatus::Done), "status")
            .await
    }

    async fn mark_canceled(&self, id: &RemoteId) -> Result<()> {
        self.patch(id, self.parser.status_value(&TaskStatus::Canceled), "status")
            .await
    }
}
