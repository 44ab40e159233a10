//! Mock implementations for test fixtures.
//!
//! Re-exports the mocks from `agentdesk::adapters::mock` and wires them into
//! a ready-to-use service.

pub use agentdesk::adapters::mock::{
    InMemoryWorkItemStore, MockChatTransport, MockHttpClient, MockResponse, WorkItemCall,
};

use agentdesk::config::DeskConfig;
use agentdesk::models::RawThread;
use agentdesk::service::ThreadsService;
use std::sync::Arc;
use std::time::Duration;

/// A service running against mock collaborators.
pub struct TestDesk {
    pub service: ThreadsService,
    pub transport: MockChatTransport,
    pub store: InMemoryWorkItemStore,
}

impl TestDesk {
    pub fn new(threads: Vec<RawThread>) -> Self {
        Self::with_config(threads, test_config())
    }

    pub fn with_config(threads: Vec<RawThread>, config: DeskConfig) -> Self {
        let transport = MockChatTransport::with_threads(threads);
        let store = InMemoryWorkItemStore::new();
        let service = ThreadsService::new(
            Arc::new(transport.clone()),
            Arc::new(store.clone()),
            config,
        );
        Self {
            service,
            transport,
            store,
        }
    }

    pub fn selected(&self) -> Option<String> {
        self.service
            .with_registry(|r| r.selected_thread_id().map(str::to_string))
    }

    pub fn resolved_notice(&self) -> Option<String> {
        self.service
            .with_registry(|r| r.resolved_thread_id().map(str::to_string))
    }

    pub fn order(&self) -> Vec<String> {
        self.service
            .with_registry(|r| r.threads().iter().map(|t| t.id.clone()).collect())
    }
}

/// Config with short timers so tests finish quickly.
pub fn test_config() -> DeskConfig {
    DeskConfig::default()
        .with_toast_auto_hide(Duration::from_millis(50))
        .with_refresh_interval(Duration::from_millis(25))
}
