//! HTTP client for the agent control API.
//!
//! The console talks to the agent server over four JSON endpoints:
//!
//! - `POST /api/start-agent` with the credential payload
//! - `POST /api/stop-agent` with no body
//! - `GET /api/status` returning the run-state snapshot
//! - `GET /api/kpis` returning the aggregate metrics
//!
//! The [`AgentApi`] trait is the seam between the console and the wire;
//! everything above it (controller, pollers) depends on the trait so tests
//! can substitute a mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Request timeout for all API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Payload for `POST /api/start-agent`.
///
/// `verification_code` serializes as JSON `null` when absent, matching the
/// server's optional field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartRequest {
    pub username: String,
    pub password: String,
    pub target_account: String,
    pub api_key: String,
    pub verification_code: Option<String>,
}

/// Run-state snapshot from `GET /api/status`.
///
/// The server is the source of truth; this is a read-only mirror replaced
/// wholesale on every successful poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AgentStatus {
    pub running: bool,
}

/// Aggregate metrics from `GET /api/kpis`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct KpiSnapshot {
    pub total_messages_sent: u64,
    pub total_replies: u64,
    pub response_rate: f64,
    pub total_qualified: u64,
    pub qualification_rate: f64,
}

/// Error body the server attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Failure modes of an API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status and a `{detail}` message.
    #[error("{detail}")]
    Api { status: u16, detail: String },
    /// The request never completed (connection refused, timeout, ...).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// The response body did not match the contracted shape.
    #[error("malformed response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    /// Whether this failure carries a server-reported `{detail}` message.
    pub fn is_application(&self) -> bool {
        matches!(self, ApiError::Api { .. })
    }
}

/// Operations exposed by the agent control API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgentApi: Send + Sync {
    /// Start the agent with the given credentials and configuration.
    async fn start_agent(&self, request: &StartRequest) -> Result<(), ApiError>;

    /// Signal the agent to stop.
    async fn stop_agent(&self) -> Result<(), ApiError>;

    /// Fetch the current run-state.
    async fn status(&self) -> Result<AgentStatus, ApiError>;

    /// Fetch the current KPI aggregates.
    async fn kpis(&self) -> Result<KpiSnapshot, ApiError>;
}

/// reqwest-backed implementation of [`AgentApi`].
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client targeting the given base URL (e.g. `http://127.0.0.1:8000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Map a non-2xx response to [`ApiError::Api`].
    ///
    /// The server contract is a JSON `{detail}` body; anything else degrades
    /// to a plain `HTTP <status>` message.
    async fn error_for(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let detail = match response.bytes().await {
            Ok(body) => serde_json::from_slice::<ErrorBody>(&body)
                .map(|b| b.detail)
                .unwrap_or_else(|_| format!("HTTP {status}")),
            Err(_) => format!("HTTP {status}"),
        };
        ApiError::Api { status, detail }
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(ApiError::Decode)
    }
}

#[async_trait]
impl AgentApi for ApiClient {
    async fn start_agent(&self, request: &StartRequest) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url("/api/start-agent"))
            .json(request)
            .send()
            .await?;

        if response.status().is_success() {
            // The success body is acknowledged but its contents are not used.
            Ok(())
        } else {
            Err(Self::error_for(response).await)
        }
    }

    async fn stop_agent(&self) -> Result<(), ApiError> {
        let response = self.http.post(self.url("/api/stop-agent")).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_for(response).await)
        }
    }

    async fn status(&self) -> Result<AgentStatus, ApiError> {
        let response = self.http.get(self.url("/api/status")).send().await?;

        if response.status().is_success() {
            Self::decode(response).await
        } else {
            Err(Self::error_for(response).await)
        }
    }

    async fn kpis(&self) -> Result<KpiSnapshot, ApiError> {
        let response = self.http.get(self.url("/api/kpis")).send().await?;

        if response.status().is_success() {
            Self::decode(response).await
        } else {
            Err(Self::error_for(response).await)
        }
    }
}
