//! Notion page payloads and their mapping to domain tasks
//!
//! A task page stores everything in its `properties` object, keyed by the
//! property names configured for the database. [`PageParser`] reads the
//! configured properties and builds a [`RemoteTask`]; it also builds the
//! property values written back by updates and creation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use tasklink_core::config::PropertyNames;
use tasklink_core::domain::{DueDate, RemoteId, RemoteTask, StatusNames, TaskStatus};

use crate::NotionError;

// ============================================================================
// Notion API response types (JSON deserialization)
// ============================================================================

/// A page object as returned by `GET /pages/{id}` and database queries
#[derive(Debug, Clone, Deserialize)]
pub struct PageObject {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    /// Archived pages are treated as deleted
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub in_trash: bool,
    #[serde(default)]
    pub last_edited_time: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl PageObject {
    /// Returns true if the page has been archived or moved to the trash
    pub fn is_gone(&self) -> bool {
        self.archived || self.in_trash
    }

    /// Text of the page's title-typed property, whatever its name
    ///
    /// Used for related pages (customers) whose schema is not configured.
    pub fn any_title(&self) -> Option<String> {
        self.properties
            .values()
            .find(|prop| prop.get("type").and_then(Value::as_str) == Some("title"))
            .and_then(|prop| rich_text(prop.get("title")?))
    }
}

/// One page of `POST /databases/{id}/query` results
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<PageObject>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Concatenated `plain_text` of a rich text array; `None` if empty
fn rich_text(value: &Value) -> Option<String> {
    let text: String = value
        .as_array()?
        .iter()
        .filter_map(|segment| segment.get("plain_text").and_then(Value::as_str))
        .collect();
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, NotionError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| NotionError::InvalidResponse(format!("bad timestamp '{value}': {e}")))
}

/// Title given to pages whose title property is empty
pub const UNTITLED: &str = "Untitled";

// ============================================================================
// PageParser
// ============================================================================

/// Reads and writes task properties using the configured property names
#[derive(Debug, Clone)]
pub struct PageParser {
    props: PropertyNames,
    statuses: StatusNames,
}

impl PageParser {
    pub fn new(props: PropertyNames, statuses: StatusNames) -> Self {
        Self { props, statuses }
    }

    pub fn properties(&self) -> &PropertyNames {
        &self.props
    }

    pub fn statuses(&self) -> &StatusNames {
        &self.statuses
    }

    fn prop<'a>(&self, page: &'a PageObject, name: &str) -> Option<&'a Value> {
        page.properties.get(name)
    }

    /// Converts a page into a task
    ///
    /// # Arguments
    /// * `page` - Page from a query or a direct fetch
    /// * `customer` - Display name of the related customer, already resolved
    ///
    /// # Errors
    /// Returns [`NotionError::InvalidResponse`] if the id, due date or
    /// modification time cannot be parsed.
    pub fn parse(&self, page: &PageObject, customer: Option<String>) -> Result<RemoteTask, NotionError> {
        let id = RemoteId::new(&page.id)
            .map_err(|e| NotionError::InvalidResponse(e.to_string()))?;

        let title = self
            .prop(page, &self.props.title)
            .and_then(|p| p.get("title"))
            .and_then(rich_text)
            .unwrap_or_else(|| UNTITLED.to_string());

        let due = match self.due_start(page) {
            Some(start) => Some(
                DueDate::parse(start).map_err(|e| NotionError::InvalidResponse(e.to_string()))?,
            ),
            None => None,
        };

        let status = self.status(page);

        let last_modified = match self.last_edited(page) {
            Some(raw) => Some(parse_timestamp(raw)?),
            None => None,
        };

        let url = page
            .url
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| RemoteTask::default_url(&id));

        Ok(RemoteTask {
            id,
            title,
            due,
            status,
            last_modified,
            customer,
            url,
        })
    }

    /// Status of the page; a missing status counts as the initial one
    pub fn status(&self, page: &PageObject) -> TaskStatus {
        let name = self
            .prop(page, &self.props.status)
            .and_then(|p| p.get("status").or_else(|| p.get("select")))
            .and_then(|s| s.get("name"))
            .and_then(Value::as_str);
        match name {
            Some(name) => TaskStatus::from_name(name, &self.statuses),
            None => TaskStatus::New,
        }
    }

    fn due_start<'a>(&self, page: &'a PageObject) -> Option<&'a str> {
        self.prop(page, &self.props.due_date)?
            .get("date")?
            .get("start")?
            .as_str()
            .filter(|s| !s.is_empty())
    }

    /// Raw last-edit timestamp: the configured property when it holds one,
    /// else the page's own `last_edited_time`
    fn last_edited<'a>(&self, page: &'a PageObject) -> Option<&'a str> {
        let from_prop = self.prop(page, &self.props.last_updated).and_then(|p| {
            p.get("last_edited_time")
                .and_then(Value::as_str)
                .or_else(|| p.get("date")?.get("start")?.as_str())
        });
        from_prop.or(page.last_edited_time.as_deref())
    }

    /// Id of the first related customer page, if any
    pub fn customer_id(&self, page: &PageObject) -> Option<RemoteId> {
        self.prop(page, &self.props.customer)?
            .get("relation")?
            .as_array()?
            .first()?
            .get("id")?
            .as_str()
            .and_then(|id| RemoteId::new(id).ok())
    }

    // ========================================================================
    // Property values for writes
    // ========================================================================

    /// `{ <title>: { title: [...] } }`
    pub fn title_value(&self, title: &str) -> Value {
        let mut map = Map::new();
        map.insert(
            self.props.title.clone(),
            json!({ "title": [ { "type": "text", "text": { "content": title } } ] }),
        );
        Value::Object(map)
    }

    /// `{ <due>: { date: { start } | null } }`, date-only
    pub fn due_value(&self, due: Option<NaiveDate>) -> Value {
        let date = match due {
            Some(day) => json!({ "start": day.format("%Y-%m-%d").to_string() }),
            None => Value::Null,
        };
        let mut map = Map::new();
        map.insert(self.props.due_date.clone(), json!({ "date": date }));
        Value::Object(map)
    }

    /// `{ <status>: { status: { name } } }`
    pub fn status_value(&self, status: &TaskStatus) -> Value {
        let mut map = Map::new();
        map.insert(
            self.props.status.clone(),
            json!({ "status": { "name": status.name(&self.statuses) } }),
        );
        Value::Object(map)
    }

    /// Full property set for a new task assigned to `user_id`
    pub fn new_task_properties(&self, title: &str, due: Option<NaiveDate>, user_id: &str) -> Value {
        let mut props = Map::new();
        merge(&mut props, self.title_value(title));
        props.insert(
            self.props.assignee.clone(),
            json!({ "people": [ { "id": user_id } ] }),
        );
        merge(&mut props, self.status_value(&TaskStatus::New));
        if due.is_some() {
            merge(&mut props, self.due_value(due));
        }
        Value::Object(props)
    }
}

fn merge(into: &mut Map<String, Value>, value: Value) {
    if let Value::Object(map) = value {
        into.extend(map);
    }
}
