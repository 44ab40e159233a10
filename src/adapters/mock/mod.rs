//! Mock implementations for testing.
//!
//! Test doubles for every trait in `crate::traits`, so the desk can be
//! exercised without network access.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses
//! - [`MockChatTransport`] - Thread listing and event injection
//! - [`InMemoryWorkItemStore`] - Status records with failure injection

pub mod chat;
pub mod http;
pub mod work_items;

pub use chat::MockChatTransport;
pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use work_items::{InMemoryWorkItemStore, WorkItemCall};
