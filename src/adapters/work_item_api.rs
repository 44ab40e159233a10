//! HTTP work-item store adapter.
//!
//! Talks to the desk backend's work-item resource:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | create | `POST {base}/work-items` `{"id", "status"}` |
//! | update | `PUT {base}/work-items/{id}` `{"status"}` |
//! | list | `GET {base}/work-items` |

use async_trait::async_trait;
use std::sync::Arc;

use crate::models::{ThreadStatus, WorkItem, WorkItemStatusUpdate};
use crate::traits::{json_headers, HttpClient, Response, WorkItemError, WorkItemStore};

/// Work-item store backed by the desk backend's REST API.
pub struct HttpWorkItemStore {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl HttpWorkItemStore {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/work-items", self.base_url)
    }

    /// Thread ids contain `:` and `@`, so they are percent-encoded.
    fn item_url(&self, thread_id: &str) -> String {
        format!(
            "{}/work-items/{}",
            self.base_url,
            urlencoding::encode(thread_id)
        )
    }

    fn check(response: Response) -> Result<Response, WorkItemError> {
        if response.is_success() {
            Ok(response)
        } else {
            let message = response.text().unwrap_or_default();
            Err(WorkItemError::Status {
                status: response.status,
                message,
            })
        }
    }

    fn encode<T: serde::Serialize>(body: &T) -> Result<String, WorkItemError> {
        serde_json::to_string(body).map_err(|e| WorkItemError::Parse(e.to_string()))
    }
}

#[async_trait]
impl WorkItemStore for HttpWorkItemStore {
    async fn create_status_record(
        &self,
        thread_id: &str,
        status: ThreadStatus,
    ) -> Result<(), WorkItemError> {
        let body = Self::encode(&WorkItem::new(thread_id, status))?;
        let response = self
            .http
            .post(&self.collection_url(), &body, &json_headers(None))
            .await?;
        Self::check(response)?;
        tracing::debug!("Created work item for thread {} ({})", thread_id, status);
        Ok(())
    }

    async fn update_status_record(
        &self,
        thread_id: &str,
        status: ThreadStatus,
    ) -> Result<(), WorkItemError> {
        let body = Self::encode(&WorkItemStatusUpdate { status })?;
        let response = self
            .http
            .put(&self.item_url(thread_id), &body, &json_headers(None))
            .await?;
        Self::check(response)?;
        tracing::debug!("Updated work item for thread {} ({})", thread_id, status);
        Ok(())
    }

    async fn list_status_records(&self) -> Result<Vec<WorkItem>, WorkItemError> {
        let response = self
            .http
            .get(&self.collection_url(), &json_headers(None))
            .await?;
        let response = Self::check(response)?;

        // An empty body means no records
        if response.body.is_empty() {
            return Ok(Vec::new());
        }
        response
            .json()
            .map_err(|e| WorkItemError::Parse(e.to_string()))
    }
}
