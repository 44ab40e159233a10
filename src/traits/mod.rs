//! Trait abstractions for dependency injection and testability.
//!
//! Every external collaborator of the desk sits behind one of these traits,
//! so the service can run against production adapters or mocks.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP client operations (GET, POST, PUT)
//! - [`ChatTransport`] - Thread listing and push events from the chat service
//! - [`WorkItemStore`] - External thread status records

pub mod chat;
pub mod http;
pub mod work_items;

pub use chat::{ChatError, ChatEvent, ChatTransport};
pub use http::{json_headers, Headers, HttpClient, HttpError, Response};
pub use work_items::{WorkItemError, WorkItemStore};
