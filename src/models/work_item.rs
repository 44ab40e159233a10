use serde::{Deserialize, Serialize};

use super::{deserialize_id, ThreadStatus};

/// External record tracking a thread's status, independent of the chat
/// transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkItem {
    /// Thread ID the work item tracks
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub status: ThreadStatus,
}

impl WorkItem {
    pub fn new(id: impl Into<String>, status: ThreadStatus) -> Self {
        Self {
            id: id.into(),
            status,
        }
    }
}

/// Body of the status update call (`PUT /work-items/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkItemStatusUpdate {
    pub status: ThreadStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_item_serialization_matches_create_body() {
        let item = WorkItem::new("19:abc@thread.v2", ThreadStatus::Active);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "19:abc@thread.v2", "status": "active"})
        );
    }

    #[test]
    fn test_status_update_body() {
        let body = WorkItemStatusUpdate {
            status: ThreadStatus::Resolved,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"status":"resolved"}"#
        );
    }

    #[test]
    fn test_work_item_list_deserialization() {
        let items: Vec<WorkItem> = serde_json::from_str(
            r#"[{"id": "t1", "status": "resolved"}, {"id": 7, "status": "active"}]"#,
        )
        .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].status, ThreadStatus::Resolved);
        assert_eq!(items[1].id, "7");
    }
}
