//! Work-item status store trait abstraction.

use async_trait::async_trait;
use thiserror::Error;

use crate::error::ErrorCategory;
use crate::models::{ThreadStatus, WorkItem};

use super::HttpError;

/// Work-item store errors.
#[derive(Debug, Clone, Error)]
pub enum WorkItemError {
    #[error("{0}")]
    Http(#[from] HttpError),

    #[error("Work-item store returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid work-item response: {0}")]
    Parse(String),
}

impl WorkItemError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WorkItemError::Http(err) => err.category(),
            WorkItemError::Status { status, .. } if *status >= 500 => ErrorCategory::Server,
            WorkItemError::Status { .. } | WorkItemError::Parse(_) => ErrorCategory::Client,
        }
    }
}

/// Trait for the external store tracking thread status.
///
/// Both writes must either complete or fail as a whole; the desk applies the
/// local status change only after a write returned `Ok`.
#[async_trait]
pub trait WorkItemStore: Send + Sync {
    /// Create the status record of a thread (`POST /work-items {id, status}`).
    async fn create_status_record(
        &self,
        thread_id: &str,
        status: ThreadStatus,
    ) -> Result<(), WorkItemError>;

    /// Update the status record of a thread (`PUT /work-items/{id} {status}`).
    async fn update_status_record(
        &self,
        thread_id: &str,
        status: ThreadStatus,
    ) -> Result<(), WorkItemError>;

    /// List all status records (`GET /work-items`).
    async fn list_status_records(&self) -> Result<Vec<WorkItem>, WorkItemError>;
}
