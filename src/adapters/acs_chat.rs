//! ACS chat transport adapter.
//!
//! Lists threads through the ACS chat REST API and fans push events out to
//! subscribers. The real-time signalling connection lives with the host; it
//! feeds events in through an [`AcsEventPublisher`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::models::RawThread;
use crate::traits::{json_headers, ChatError, ChatEvent, ChatTransport, HttpClient};

/// ACS chat REST API version used for thread listing.
pub const ACS_API_VERSION: &str = "2021-09-07";

/// Number of threads requested per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 50;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// One page of `GET /chat/threads`.
#[derive(Debug, Deserialize)]
struct ThreadPage {
    #[serde(default)]
    value: Vec<RawThread>,
}

/// Identifier of a communication participant in ACS event payloads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommunicationIdentifier {
    #[serde(default)]
    communication_user_id: Option<String>,
    #[serde(default)]
    raw_id: Option<String>,
}

/// `chatMessageReceived` signalling payload (fields the desk reads).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageReceivedPayload {
    thread_id: String,
    sender: CommunicationIdentifier,
    created_on: DateTime<Utc>,
}

/// `chatThreadCreated` signalling payload (fields the desk reads).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadCreatedPayload {
    thread_id: String,
}

/// Handle the host's signalling bridge uses to push events into the
/// transport. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AcsEventPublisher {
    tx: broadcast::Sender<ChatEvent>,
}

impl AcsEventPublisher {
    /// Publish an event to every current subscriber.
    ///
    /// Returns the number of subscribers that received it.
    pub fn publish(&self, event: ChatEvent) -> usize {
        // No subscribers yet is not an error
        self.tx.send(event).unwrap_or(0)
    }

    pub fn thread_created(&self, thread_id: impl Into<String>) -> usize {
        self.publish(ChatEvent::ThreadCreated {
            thread_id: thread_id.into(),
        })
    }

    pub fn message_received(
        &self,
        thread_id: impl Into<String>,
        sender_id: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> usize {
        self.publish(ChatEvent::MessageReceived {
            thread_id: thread_id.into(),
            sender_id: sender_id.into(),
            occurred_at,
        })
    }

    /// Decode a raw ACS signalling event and publish it.
    ///
    /// `kind` is the ACS event name (`chatThreadCreated`,
    /// `chatMessageReceived`). Other event kinds are ignored and yield
    /// `Ok(None)`.
    pub fn publish_signalling(
        &self,
        kind: &str,
        payload: &str,
    ) -> Result<Option<ChatEvent>, ChatError> {
        let event = match kind {
            "chatThreadCreated" => {
                let payload: ThreadCreatedPayload = serde_json::from_str(payload)
                    .map_err(|e| ChatError::Parse(e.to_string()))?;
                ChatEvent::ThreadCreated {
                    thread_id: payload.thread_id,
                }
            }
            "chatMessageReceived" => {
                let payload: MessageReceivedPayload = serde_json::from_str(payload)
                    .map_err(|e| ChatError::Parse(e.to_string()))?;
                let sender_id = payload
                    .sender
                    .communication_user_id
                    .or(payload.sender.raw_id)
                    .unwrap_or_default();
                ChatEvent::MessageReceived {
                    thread_id: payload.thread_id,
                    sender_id,
                    occurred_at: payload.created_on,
                }
            }
            other => {
                tracing::trace!("Ignoring signalling event {}", other);
                return Ok(None);
            }
        };

        self.publish(event.clone());
        Ok(Some(event))
    }
}

/// Chat transport backed by the ACS chat REST API.
pub struct AcsChatTransport {
    http: Arc<dyn HttpClient>,
    endpoint_url: String,
    token: String,
    page_size: usize,
    events: broadcast::Sender<ChatEvent>,
}

impl AcsChatTransport {
    pub fn new(
        http: Arc<dyn HttpClient>,
        endpoint_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            http,
            endpoint_url: endpoint_url.into(),
            token: token.into(),
            page_size: DEFAULT_PAGE_SIZE,
            events,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Handle for feeding signalling events into this transport.
    pub fn publisher(&self) -> AcsEventPublisher {
        AcsEventPublisher {
            tx: self.events.clone(),
        }
    }

    fn threads_url(&self) -> String {
        format!(
            "{}/chat/threads?api-version={}&maxPageSize={}",
            self.endpoint_url.trim_end_matches('/'),
            ACS_API_VERSION,
            self.page_size
        )
    }
}

#[async_trait]
impl ChatTransport for AcsChatTransport {
    async fn list_threads(&self) -> Result<Vec<RawThread>, ChatError> {
        let url = self.threads_url();
        let response = self
            .http
            .get(&url, &json_headers(Some(&self.token)))
            .await?;

        if !response.is_success() {
            let message = response.text().unwrap_or_default();
            tracing::error!("Thread listing failed with {}: {}", response.status, message);
            return Err(ChatError::Status {
                status: response.status,
                message,
            });
        }

        let page: ThreadPage = response
            .json()
            .map_err(|e| ChatError::Parse(e.to_string()))?;
        tracing::debug!("Listed {} threads", page.value.len());
        Ok(page.value)
    }

    fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }
}
