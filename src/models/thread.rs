use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{deserialize_id, deserialize_nullable_string};

/// Status of a customer thread as seen by the agent.
///
/// Serialized lowercase (`"active"` / `"resolved"`), which is also the wire
/// format of the work-item store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    /// Open conversation awaiting agent attention (default)
    #[default]
    Active,
    /// Closed by the agent or the backend, reopened by new customer activity
    Resolved,
}

impl ThreadStatus {
    /// Wire value of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadStatus::Active => "active",
            ThreadStatus::Resolved => "resolved",
        }
    }

    /// Label of the thread-list tab showing threads with this status.
    pub fn tab_label(&self) -> &'static str {
        match self {
            ThreadStatus::Active => "Active",
            ThreadStatus::Resolved => "Resolved",
        }
    }

    /// Parse a tab label or wire value, ignoring case.
    pub fn from_tab(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "active" => Some(ThreadStatus::Active),
            "resolved" => Some(ThreadStatus::Resolved),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ThreadStatus::Active)
    }

    /// Sort rank when threads are partitioned by status (active first).
    pub(crate) fn partition_rank(&self) -> u8 {
        match self {
            ThreadStatus::Active => 0,
            ThreadStatus::Resolved => 1,
        }
    }
}

impl fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A thread as reported by the chat transport.
///
/// Field names follow the ACS chat thread item JSON
/// (`id`, `topic`, `lastMessageReceivedOn`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawThread {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Customer display name
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub topic: String,
    /// Missing for threads that never received a message
    #[serde(default, alias = "last_message_received_on")]
    pub last_message_received_on: Option<DateTime<Utc>>,
}

impl RawThread {
    pub fn new(id: impl Into<String>, topic: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            last_message_received_on: Some(at),
        }
    }
}

/// A thread tracked by the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThreadRecord {
    /// Opaque, unique thread identifier
    pub id: String,
    /// Display label (customer / thread name)
    pub topic: String,
    /// Time of the most recent message
    pub last_activity_at: DateTime<Utc>,
    pub status: ThreadStatus,
}

impl ThreadRecord {
    pub fn new(
        id: impl Into<String>,
        topic: impl Into<String>,
        last_activity_at: DateTime<Utc>,
        status: ThreadStatus,
    ) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            last_activity_at,
            status,
        }
    }

    /// Normalize a transport thread into an ACTIVE record.
    ///
    /// Threads without a last-message timestamp sort as the oldest.
    pub fn from_raw(raw: RawThread) -> Self {
        Self {
            id: raw.id,
            topic: raw.topic,
            last_activity_at: raw.last_message_received_on.unwrap_or_default(),
            status: ThreadStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_thread_status_default_is_active() {
        assert_eq!(ThreadStatus::default(), ThreadStatus::Active);
    }

    #[test]
    fn test_thread_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ThreadStatus::Active).unwrap(),
            r#""active""#
        );
        assert_eq!(
            serde_json::to_string(&ThreadStatus::Resolved).unwrap(),
            r#""resolved""#
        );
        let parsed: ThreadStatus = serde_json::from_str(r#""resolved""#).unwrap();
        assert_eq!(parsed, ThreadStatus::Resolved);
    }

    #[test]
    fn test_thread_status_rejects_unknown_value() {
        assert!(serde_json::from_str::<ThreadStatus>(r#""archived""#).is_err());
    }

    #[test]
    fn test_from_tab() {
        assert_eq!(ThreadStatus::from_tab("Active"), Some(ThreadStatus::Active));
        assert_eq!(ThreadStatus::from_tab("RESOLVED"), Some(ThreadStatus::Resolved));
        assert_eq!(ThreadStatus::from_tab(" resolved "), Some(ThreadStatus::Resolved));
        assert_eq!(ThreadStatus::from_tab("Archived"), None);
    }

    #[test]
    fn test_tab_label_round_trips_through_from_tab() {
        for status in [ThreadStatus::Active, ThreadStatus::Resolved] {
            assert_eq!(ThreadStatus::from_tab(status.tab_label()), Some(status));
        }
    }

    #[test]
    fn test_raw_thread_from_acs_json() {
        let json = r#"{
            "id": "19:abc@thread.v2",
            "topic": "Contoso Ltd",
            "lastMessageReceivedOn": "2024-05-01T10:15:00Z"
        }"#;
        let raw: RawThread = serde_json::from_str(json).unwrap();
        assert_eq!(raw.id, "19:abc@thread.v2");
        assert_eq!(raw.topic, "Contoso Ltd");
        assert_eq!(
            raw.last_message_received_on,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 0).unwrap())
        );
    }

    #[test]
    fn test_raw_thread_with_null_topic_and_no_timestamp() {
        let raw: RawThread = serde_json::from_str(r#"{"id": "t1", "topic": null}"#).unwrap();
        assert_eq!(raw.topic, "");
        assert!(raw.last_message_received_on.is_none());

        let record = ThreadRecord::from_raw(raw);
        assert_eq!(record.last_activity_at, DateTime::<Utc>::default());
        assert_eq!(record.status, ThreadStatus::Active);
    }

    #[test]
    fn test_from_raw_normalizes_to_active() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let record = ThreadRecord::from_raw(RawThread::new("t1", "Fabrikam", at));
        assert_eq!(record.id, "t1");
        assert_eq!(record.topic, "Fabrikam");
        assert_eq!(record.last_activity_at, at);
        assert!(record.is_active());
    }
}
