//! Thread registry module
//!
//! Keeps the agent-visible thread list ordered and deduplicated, tracks the
//! selected thread and the resolved-notice pointer, and publishes every change
//! to watch channels so UI layers can observe state without calling back in.

mod ordering;
mod selection;

pub use ordering::OrderRule;

use tokio::sync::watch;

use crate::models::{ThreadRecord, ThreadStatus};

/// Read-only projections of registry state.
///
/// Each receiver always holds the latest value; `changed()` resolves after
/// every mutation that touched the corresponding field.
#[derive(Debug, Clone)]
pub struct RegistryViews {
    pub threads: watch::Receiver<Vec<ThreadRecord>>,
    pub selected_thread_id: watch::Receiver<Option<String>>,
    pub resolved_thread_id: watch::Receiver<Option<String>>,
    pub is_loading: watch::Receiver<bool>,
}

/// Single source of truth for the thread list and its selection pointers.
///
/// All mutations are synchronous and infallible. Operations that reference
/// an unknown thread are no-ops that log a warning and return `false`.
#[derive(Debug)]
pub struct ThreadRegistry {
    /// Threads in display order
    pub(crate) threads: Vec<ThreadRecord>,
    /// Currently selected thread, always present in `threads` when set
    pub(crate) selected_thread_id: Option<String>,
    /// Most recently auto-resolved thread (toast banner)
    pub(crate) resolved_thread_id: Option<String>,
    pub(crate) is_loading: bool,
    threads_tx: watch::Sender<Vec<ThreadRecord>>,
    selected_tx: watch::Sender<Option<String>>,
    resolved_tx: watch::Sender<Option<String>>,
    loading_tx: watch::Sender<bool>,
}

impl ThreadRegistry {
    /// Create an empty registry with nothing selected.
    pub fn new() -> Self {
        let (threads_tx, _) = watch::channel(Vec::new());
        let (selected_tx, _) = watch::channel(None);
        let (resolved_tx, _) = watch::channel(None);
        let (loading_tx, _) = watch::channel(false);

        Self {
            threads: Vec::new(),
            selected_thread_id: None,
            resolved_thread_id: None,
            is_loading: false,
            threads_tx,
            selected_tx,
            resolved_tx,
            loading_tx,
        }
    }

    /// Subscribe to all projections.
    pub fn subscribe(&self) -> RegistryViews {
        RegistryViews {
            threads: self.threads_tx.subscribe(),
            selected_thread_id: self.selected_tx.subscribe(),
            resolved_thread_id: self.resolved_tx.subscribe(),
            is_loading: self.loading_tx.subscribe(),
        }
    }

    /// Threads in display order.
    pub fn threads(&self) -> &[ThreadRecord] {
        &self.threads
    }

    pub fn get(&self, thread_id: &str) -> Option<&ThreadRecord> {
        self.threads.iter().find(|t| t.id == thread_id)
    }

    pub fn contains(&self, thread_id: &str) -> bool {
        self.position(thread_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    pub fn selected_thread_id(&self) -> Option<&str> {
        self.selected_thread_id.as_deref()
    }

    pub fn resolved_thread_id(&self) -> Option<&str> {
        self.resolved_thread_id.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Threads with the given status, in display order.
    pub fn threads_with_status(&self, status: ThreadStatus) -> Vec<&ThreadRecord> {
        self.threads.iter().filter(|t| t.status == status).collect()
    }

    /// First thread (in display order) with the given status.
    pub fn first_with_status(&self, status: ThreadStatus) -> Option<&ThreadRecord> {
        self.threads.iter().find(|t| t.status == status)
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
        self.loading_tx.send_replace(loading);
    }

    pub(crate) fn position(&self, thread_id: &str) -> Option<usize> {
        self.threads.iter().position(|t| t.id == thread_id)
    }

    pub(crate) fn publish_threads(&self) {
        self.threads_tx.send_replace(self.threads.clone());
    }

    pub(crate) fn publish_selected(&self) {
        self.selected_tx.send_replace(self.selected_thread_id.clone());
    }

    pub(crate) fn publish_resolved(&self) {
        self.resolved_tx.send_replace(self.resolved_thread_id.clone());
    }
}

impl Default for ThreadRegistry {
    fn default() -> Self {
        Self::new()
    }
}
