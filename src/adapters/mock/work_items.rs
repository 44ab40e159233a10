//! In-memory work-item store for testing.
//!
//! Keeps status records in a map, records every call, and can fail or hold
//! writes on demand.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use crate::models::{ThreadStatus, WorkItem};
use crate::traits::{WorkItemError, WorkItemStore};

/// A call made against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItemCall {
    Create {
        thread_id: String,
        status: ThreadStatus,
    },
    Update {
        thread_id: String,
        status: ThreadStatus,
    },
    List,
}

/// In-memory work-item store for testing.
///
/// # Example
///
/// ```ignore
/// use agentdesk::adapters::mock::{InMemoryWorkItemStore, WorkItemCall};
///
/// let store = InMemoryWorkItemStore::new();
/// store.update_status_record("t1", ThreadStatus::Resolved).await?;
/// assert_eq!(store.status_of("t1"), Some(ThreadStatus::Resolved));
///
/// store.set_write_error(Some(WorkItemError::Parse("boom".into())));
/// assert!(store.create_status_record("t1", ThreadStatus::Active).await.is_err());
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryWorkItemStore {
    records: Arc<Mutex<HashMap<String, ThreadStatus>>>,
    calls: Arc<Mutex<Vec<WorkItemCall>>>,
    write_error: Arc<Mutex<Option<WorkItemError>>>,
    list_error: Arc<Mutex<Option<WorkItemError>>>,
    /// While true, writes wait before completing
    paused: Arc<watch::Sender<bool>>,
}

impl InMemoryWorkItemStore {
    pub fn new() -> Self {
        let (paused, _) = watch::channel(false);
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            write_error: Arc::new(Mutex::new(None)),
            list_error: Arc::new(Mutex::new(None)),
            paused: Arc::new(paused),
        }
    }

    /// Create a store holding `items`.
    pub fn with_records(items: Vec<WorkItem>) -> Self {
        let store = Self::new();
        store.set_records(items);
        store
    }

    pub fn set_records(&self, items: Vec<WorkItem>) {
        let mut records = self.records.lock().unwrap();
        records.clear();
        records.extend(items.into_iter().map(|item| (item.id, item.status)));
    }

    pub fn status_of(&self, thread_id: &str) -> Option<ThreadStatus> {
        self.records.lock().unwrap().get(thread_id).copied()
    }

    /// Make writes fail with `error` until cleared with `None`.
    pub fn set_write_error(&self, error: Option<WorkItemError>) {
        *self.write_error.lock().unwrap() = error;
    }

    pub fn set_list_error(&self, error: Option<WorkItemError>) {
        *self.list_error.lock().unwrap() = error;
    }

    /// Hold every write until [`resume_writes`](Self::resume_writes).
    pub fn pause_writes(&self) {
        self.paused.send_replace(true);
    }

    pub fn resume_writes(&self) {
        self.paused.send_replace(false);
    }

    pub fn calls(&self) -> Vec<WorkItemCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Write calls only (creates and updates).
    pub fn write_calls(&self) -> Vec<WorkItemCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, WorkItemCall::List))
            .collect()
    }

    async fn write(
        &self,
        call: WorkItemCall,
        thread_id: &str,
        status: ThreadStatus,
    ) -> Result<(), WorkItemError> {
        self.calls.lock().unwrap().push(call);

        let mut paused = self.paused.subscribe();
        while *paused.borrow_and_update() {
            if paused.changed().await.is_err() {
                break;
            }
        }

        if let Some(err) = self.write_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.records
            .lock()
            .unwrap()
            .insert(thread_id.to_string(), status);
        Ok(())
    }
}

impl Default for InMemoryWorkItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkItemStore for InMemoryWorkItemStore {
    async fn create_status_record(
        &self,
        thread_id: &str,
        status: ThreadStatus,
    ) -> Result<(), WorkItemError> {
        let call = WorkItemCall::Create {
            thread_id: thread_id.to_string(),
            status,
        };
        self.write(call, thread_id, status).await
    }

    async fn update_status_record(
        &self,
        thread_id: &str,
        status: ThreadStatus,
    ) -> Result<(), WorkItemError> {
        let call = WorkItemCall::Update {
            thread_id: thread_id.to_string(),
            status,
        };
        self.write(call, thread_id, status).await
    }

    async fn list_status_records(&self) -> Result<Vec<WorkItem>, WorkItemError> {
        self.calls.lock().unwrap().push(WorkItemCall::List);

        if let Some(err) = self.list_error.lock().unwrap().clone() {
            return Err(err);
        }
        let mut items: Vec<WorkItem> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .map(|(id, status)| WorkItem::new(id.clone(), *status))
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }
}
