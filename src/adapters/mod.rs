//! Concrete implementations of trait abstractions.
//!
//! Production adapters for the traits defined in `crate::traits`.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`AcsChatTransport`] - Thread listing over the ACS chat REST API
//! - [`HttpWorkItemStore`] - Status records on the desk backend
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles for all traits:
//! - [`mock::MockHttpClient`] - Configurable HTTP responses
//! - [`mock::MockChatTransport`] - Event injection for testing
//! - [`mock::InMemoryWorkItemStore`] - In-memory status records

pub mod acs_chat;
pub mod mock;
pub mod reqwest_http;
pub mod work_item_api;

pub use acs_chat::{AcsChatTransport, AcsEventPublisher};
pub use mock::{InMemoryWorkItemStore, MockChatTransport, MockHttpClient};
pub use reqwest_http::ReqwestHttpClient;
pub use work_item_api::HttpWorkItemStore;
