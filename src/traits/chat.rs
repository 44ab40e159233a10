//! Chat transport trait abstraction.
//!
//! The chat transport owns thread existence and message delivery. The desk
//! only consumes two things from it: the thread listing and a stream of push
//! events.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::error::ErrorCategory;
use crate::models::RawThread;

use super::HttpError;

/// Push events from the chat transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A thread the agent participates in was created
    ThreadCreated { thread_id: String },
    /// A message arrived on a thread
    MessageReceived {
        thread_id: String,
        /// Communication user id of the sender
        sender_id: String,
        occurred_at: DateTime<Utc>,
    },
}

impl ChatEvent {
    pub fn thread_id(&self) -> &str {
        match self {
            ChatEvent::ThreadCreated { thread_id } => thread_id,
            ChatEvent::MessageReceived { thread_id, .. } => thread_id,
        }
    }
}

/// Chat transport errors.
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    #[error("{0}")]
    Http(#[from] HttpError),

    #[error("Chat service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid thread listing: {0}")]
    Parse(String),

    /// The transport has not been connected
    #[error("Chat transport not connected")]
    NotConnected,
}

impl ChatError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChatError::Http(err) => err.category(),
            ChatError::Status { status, .. } if *status >= 500 => ErrorCategory::Server,
            ChatError::Status { .. } | ChatError::Parse(_) => ErrorCategory::Client,
            ChatError::NotConnected => ErrorCategory::Configuration,
        }
    }
}

/// Trait for the chat transport the desk reads threads from.
///
/// # Example
///
/// ```ignore
/// use agentdesk::traits::{ChatEvent, ChatTransport};
///
/// async fn watch<T: ChatTransport>(transport: &T) {
///     let threads = transport.list_threads().await?;
///     let mut events = transport.subscribe();
///     while let Ok(event) = events.recv().await {
///         println!("{} on {}", threads.len(), event.thread_id());
///     }
/// }
/// ```
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Fetch the first page of threads the agent participates in.
    async fn list_threads(&self) -> Result<Vec<RawThread>, ChatError>;

    /// Subscribe to push events.
    ///
    /// Returns a broadcast receiver that will receive copies of all events
    /// published after the call. Multiple subscribers can exist simultaneously.
    fn subscribe(&self) -> broadcast::Receiver<ChatEvent>;
}
