//! Agent identity bootstrap.
//!
//! Before the desk can list threads it needs three things from the desk
//! backend: the agent's ACS user, the ACS endpoint, and an access token for
//! that user. [`AgentSession::bootstrap`] chains the three calls.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::error::ErrorCategory;
use crate::traits::{json_headers, HttpClient, HttpError};

/// Errors from the desk backend identity endpoints.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    #[error("{0}")]
    Http(#[from] HttpError),

    #[error("Desk backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid desk backend response: {0}")]
    Parse(String),

    /// The backend answered but left out a value the desk needs
    #[error("Desk backend returned no {0}")]
    Missing(&'static str),
}

impl AgentError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AgentError::Http(err) => err.category(),
            AgentError::Status { status, .. } if *status >= 500 => ErrorCategory::Server,
            AgentError::Status { .. } | AgentError::Parse(_) => ErrorCategory::Client,
            AgentError::Missing(_) => ErrorCategory::Configuration,
        }
    }
}

/// `{ "data": ... }` envelope used by every desk backend endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

/// ACS identity of a Teams user (`GET TeamsChat/agentACSUser`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcsUser {
    pub acs_user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenData {
    #[serde(default)]
    token: String,
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    #[serde(rename = "SalesRepAcsUserId")]
    sales_rep_acs_user_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SalesRepInfoRequest<'a> {
    aad_object_id: &'a str,
}

/// Client for the desk backend's `TeamsChat` endpoints.
pub struct AgentApiClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl AgentApiClient {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/TeamsChat/{}", self.base_url, path)
    }

    async fn get_data<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, AgentError> {
        let response = self.http.get(url, &json_headers(None)).await?;
        Self::decode(response)
    }

    async fn post_data<T, B>(&self, url: &str, body: &B) -> Result<T, AgentError>
    where
        T: serde::de::DeserializeOwned,
        B: Serialize,
    {
        let body = serde_json::to_string(body).map_err(|e| AgentError::Parse(e.to_string()))?;
        let response = self.http.post(url, &body, &json_headers(None)).await?;
        Self::decode(response)
    }

    fn decode<T: serde::de::DeserializeOwned>(
        response: crate::traits::Response,
    ) -> Result<T, AgentError> {
        if !response.is_success() {
            return Err(AgentError::Status {
                status: response.status,
                message: response.text().unwrap_or_default(),
            });
        }
        response
            .json()
            .map_err(|e| AgentError::Parse(e.to_string()))
    }

    /// Resolve the ACS user mapped to a Teams user.
    pub async fn acs_user(&self, teams_user_id: &str) -> Result<AcsUser, AgentError> {
        let url = format!(
            "{}/?teamsUserId={}",
            self.url("agentACSUser"),
            urlencoding::encode(teams_user_id)
        );
        let envelope: Envelope<AcsUser> = self.get_data(&url).await?;
        envelope.data.ok_or(AgentError::Missing("ACS user"))
    }

    /// ACS endpoint the chat transport should talk to.
    pub async fn endpoint_url(&self) -> Result<String, AgentError> {
        let envelope: Envelope<String> = self.get_data(&self.url("getEndpointUrl")).await?;
        envelope
            .data
            .filter(|url| !url.is_empty())
            .ok_or(AgentError::Missing("endpoint URL"))
    }

    /// Issue an ACS access token for the agent.
    pub async fn token(&self, acs_user_id: &str) -> Result<String, AgentError> {
        let request = TokenRequest {
            sales_rep_acs_user_id: acs_user_id,
        };
        let envelope: Envelope<TokenData> =
            self.post_data(&self.url("salesAgent-token"), &request).await?;
        envelope
            .data
            .map(|data| data.token)
            .filter(|token| !token.is_empty())
            .ok_or(AgentError::Missing("access token"))
    }

    /// Sales rep profile of a Teams user, passed through as returned.
    pub async fn sales_rep_info(&self, teams_user_id: &str) -> Result<serde_json::Value, AgentError> {
        let request = SalesRepInfoRequest {
            aad_object_id: teams_user_id,
        };
        self.post_data(&self.url("getSalesRepInfo"), &request).await
    }
}

/// Everything the desk needs to talk to the chat transport as the agent.
#[derive(Clone, PartialEq)]
pub struct AgentSession {
    /// ACS communication user id; messages from this id are the agent's own
    pub user_id: String,
    pub display_name: Option<String>,
    pub token: String,
    pub endpoint_url: String,
}

impl std::fmt::Debug for AgentSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSession")
            .field("user_id", &self.user_id)
            .field("display_name", &self.display_name)
            .field("token", &"<redacted>")
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl AgentSession {
    /// Resolve the agent's ACS user, then the endpoint and a token for it.
    pub async fn bootstrap(api: &AgentApiClient, teams_user_id: &str) -> Result<Self, AgentError> {
        let user = api.acs_user(teams_user_id).await?;
        tracing::info!("Resolved ACS user {} for Teams user", user.acs_user_id);

        let endpoint_url = api.endpoint_url().await?;
        let token = api.token(&user.acs_user_id).await?;
        tracing::debug!("Agent session ready on {}", endpoint_url);

        Ok(Self {
            user_id: user.acs_user_id,
            display_name: user.display_name,
            token,
            endpoint_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use serde_json::json;

    const BASE: &str = "http://localhost:8080";

    fn api(client: &MockHttpClient) -> AgentApiClient {
        AgentApiClient::new(Arc::new(client.clone()), BASE)
    }

    fn mock_backend() -> MockHttpClient {
        let client = MockHttpClient::new();
        client.set_response(
            "http://localhost:8080/TeamsChat/agentACSUser",
            MockResponse::json(
                200,
                &json!({"data": {"acsUserId": "8:acs:agent", "displayName": "Dana"}}),
            ),
        );
        client.set_response(
            "http://localhost:8080/TeamsChat/getEndpointUrl",
            MockResponse::json(
                200,
                &json!({"data": "https://desk.communication.azure.com/"}),
            ),
        );
        client.set_response(
            "http://localhost:8080/TeamsChat/salesAgent-token",
            MockResponse::json(200, &json!({"data": {"token": "acs-token"}})),
        );
        client
    }

    #[tokio::test]
    async fn test_bootstrap_chains_calls() {
        let client = mock_backend();
        let session = AgentSession::bootstrap(&api(&client), "aad-123").await.unwrap();

        assert_eq!(session.user_id, "8:acs:agent");
        assert_eq!(session.display_name.as_deref(), Some("Dana"));
        assert_eq!(session.token, "acs-token");
        assert_eq!(session.endpoint_url, "https://desk.communication.azure.com/");

        let requests = client.get_requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(
            requests[0].url,
            "http://localhost:8080/TeamsChat/agentACSUser/?teamsUserId=aad-123"
        );
        assert_eq!(requests[2].method, "POST");
        let body: serde_json::Value =
            serde_json::from_str(requests[2].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"SalesRepAcsUserId": "8:acs:agent"}));
    }

    #[tokio::test]
    async fn test_missing_acs_user() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::json(200, &json!({"data": null})));

        let err = AgentSession::bootstrap(&api(&client), "aad-123")
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Missing("ACS user")));
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(client.get_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_token_is_missing() {
        let client = mock_backend();
        client.set_response(
            "http://localhost:8080/TeamsChat/salesAgent-token",
            MockResponse::json(200, &json!({"data": {"token": ""}})),
        );

        let err = AgentSession::bootstrap(&api(&client), "aad-123")
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Missing("access token")));
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::json(502, &json!({"error": "bad gateway"})));

        let err = api(&client).endpoint_url().await.unwrap_err();
        assert!(matches!(err, AgentError::Status { status: 502, .. }));
        assert!(err.category().is_retryable());
    }

    #[tokio::test]
    async fn test_sales_rep_info_passthrough() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::json(200, &json!({"data": {"name": "Dana"}})));

        let info = api(&client).sales_rep_info("aad-123").await.unwrap();
        assert_eq!(info["data"]["name"], "Dana");
        assert_eq!(
            client.get_requests()[0].body.as_deref(),
            Some(r#"{"aadObjectId":"aad-123"}"#)
        );
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = AgentSession {
            user_id: "8:acs:agent".to_string(),
            display_name: None,
            token: "secret".to_string(),
            endpoint_url: "https://x".to_string(),
        };
        let rendered = format!("{:?}", session);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
