//! Database query bodies
//!
//! The active task set is everything assigned to the configured user whose
//! status is not terminal, optionally excluding one task type. The filter
//! is applied server-side.

use serde_json::{json, Value};

use tasklink_core::config::PropertyNames;
use tasklink_core::domain::StatusNames;

/// Maximum page size accepted by the Notion API
pub const PAGE_SIZE: u32 = 100;

/// Builds the compound `and` filter selecting the active task set
pub fn active_tasks_filter(
    props: &PropertyNames,
    statuses: &StatusNames,
    user_id: &str,
    type_exclude: Option<&str>,
) -> Value {
    let mut conditions = vec![
        json!({ "property": props.assignee, "people": { "contains": user_id } }),
        json!({ "property": props.status, "status": { "does_not_equal": statuses.done } }),
        json!({ "property": props.status, "status": { "does_not_equal": statuses.canceled } }),
    ];

    if let Some(excluded) = type_exclude.filter(|t| !t.is_empty()) {
        conditions.push(json!({
            "property": props.task_type,
            "select": { "does_not_equal": excluded }
        }));
    }

    json!({ "and": conditions })
}

/// Request body for one page of results
pub fn query_body(filter: &Value, start_cursor: Option<&str>) -> Value {
    let mut body = json!({ "filter": filter, "page_size": PAGE_SIZE });
    if let Some(cursor) = start_cursor {
        body["start_cursor"] = Value::String(cursor.to_string());
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_with_type_exclusion() {
        let filter = active_tasks_filter(
            &PropertyNames::default(),
            &StatusNames::default(),
            "user-1",
            Some("Onboarding"),
        );
        let conditions = filter["and"].as_array().unwrap();
        assert_eq!(conditions.len(), 4);
        assert_eq!(conditions[0]["people"]["contains"], "user-1");
        assert_eq!(conditions[1]["status"]["does_not_equal"], "Done");
        assert_eq!(conditions[2]["status"]["does_not_equal"], "Canceled");
        assert_eq!(conditions[3]["property"], "Type");
        assert_eq!(conditions[3]["select"]["does_not_equal"], "Onboarding");
    }

    #[test]
    fn test_filter_without_type_exclusion() {
        let filter = active_tasks_filter(
            &PropertyNames::default(),
            &StatusNames::default(),
            "user-1",
            None,
        );
        assert_eq!(filter["and"].as_array().unwrap().len(), 3);

        let empty = active_tasks_filter(
            &PropertyNames::default(),
            &StatusNames::default(),
            "user-1",
            Some(""),
        );
        assert_eq!(empty["and"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_query_body_cursor() {
        let filter = json!({ "and": [] });
        let first = query_body(&filter, None);
        assert_eq!(first["page_size"], 100);
        assert!(first.get("start_cursor").is_none());

        let next = query_body(&filter, Some("cursor-2"));
        assert_eq!(next["start_cursor"], "cursor-2");
    }
}
