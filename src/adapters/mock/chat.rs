//! Mock chat transport for testing.
//!
//! Serves a configurable thread listing and lets tests inject push events.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

use crate::models::RawThread;
use crate::traits::{ChatError, ChatEvent, ChatTransport};

/// Mock chat transport for testing.
///
/// # Example
///
/// ```ignore
/// use agentdesk::adapters::mock::MockChatTransport;
///
/// let transport = MockChatTransport::with_threads(vec![RawThread::new("t1", "Alice", now)]);
/// let mut rx = transport.subscribe();
/// transport.inject_thread_created("t2");
/// assert_eq!(rx.recv().await?.thread_id(), "t2");
/// ```
#[derive(Debug, Clone)]
pub struct MockChatTransport {
    threads: Arc<Mutex<Vec<RawThread>>>,
    /// Error returned by the next listings instead of `threads`
    list_error: Arc<Mutex<Option<ChatError>>>,
    list_calls: Arc<AtomicUsize>,
    events: broadcast::Sender<ChatEvent>,
}

impl MockChatTransport {
    pub fn new() -> Self {
        Self::with_threads(Vec::new())
    }

    pub fn with_threads(threads: Vec<RawThread>) -> Self {
        let (events, _) = broadcast::channel(100);
        Self {
            threads: Arc::new(Mutex::new(threads)),
            list_error: Arc::new(Mutex::new(None)),
            list_calls: Arc::new(AtomicUsize::new(0)),
            events,
        }
    }

    /// Replace the listing served by `list_threads`.
    pub fn set_threads(&self, threads: Vec<RawThread>) {
        *self.threads.lock().unwrap() = threads;
    }

    pub fn push_thread(&self, thread: RawThread) {
        self.threads.lock().unwrap().push(thread);
    }

    /// Make listings fail with `error` until cleared with `None`.
    pub fn set_list_error(&self, error: Option<ChatError>) {
        *self.list_error.lock().unwrap() = error;
    }

    pub fn list_call_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Deliver an event to all subscribers.
    pub fn inject_event(&self, event: ChatEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.events.send(event);
    }

    pub fn inject_thread_created(&self, thread_id: &str) {
        self.inject_event(ChatEvent::ThreadCreated {
            thread_id: thread_id.to_string(),
        });
    }

    pub fn inject_message(&self, thread_id: &str, sender_id: &str, occurred_at: DateTime<Utc>) {
        self.inject_event(ChatEvent::MessageReceived {
            thread_id: thread_id.to_string(),
            sender_id: sender_id.to_string(),
            occurred_at,
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }
}

impl Default for MockChatTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for MockChatTransport {
    async fn list_threads(&self) -> Result<Vec<RawThread>, ChatError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.list_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.threads.lock().unwrap().clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }
}
