//! Planner client: sends the user's prompt plus a session snapshot to the
//! external planner and receives a [`RawPlan`].
//!
//! The contract is a single JSON request/response:
//!
//! ```text
//! POST {base_url}/agent
//!   {"prompt": "...", "context": {"tabs": [...], "bookmarks": [...]}}
//! <- {"action": "organize_tabs", "output": {...}}
//! ```
//!
//! Any transport failure, non-2xx status or undecodable body is fatal for
//! the invocation and is never retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plan::RawPlan;
use crate::snapshot::PlanContext;

/// Request body sent to the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub prompt: String,
    pub context: PlanContext,
}

/// Errors talking to the planner.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("planner request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("planner returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("planner response is malformed: {0}")]
    Malformed(String),
}

/// Source of plans for a prompt.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, request: &PlanRequest) -> Result<RawPlan, PlannerError>;
}

/// Connection settings for [`HttpPlanner`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpPlannerConfig {
    /// Base URL of the planner service, without the `/agent` path.
    pub base_url: String,
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl HttpPlannerConfig {
    /// The planner address used when nothing else is configured.
    pub const DEFAULT_URL: &str = "http://127.0.0.1:8000";

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    /// Full URL of the plan endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/agent", self.base_url.trim_end_matches('/'))
    }
}

impl Default for HttpPlannerConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_URL)
    }
}

/// Planner reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPlanner {
    client: Client,
    endpoint: String,
}

impl HttpPlanner {
    pub fn new(config: &HttpPlannerConfig) -> Result<Self, PlannerError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(PlannerError::Client)?;
        Ok(Self {
            client,
            endpoint: config.endpoint(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Planner for HttpPlanner {
    async fn plan(&self, request: &PlanRequest) -> Result<RawPlan, PlannerError> {
        tracing::info!(
            endpoint = %self.endpoint,
            groups = request.context.tabs.len(),
            "requesting plan"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(PlannerError::Request)?;

        let status = response.status();
        let body = response.text().await.map_err(PlannerError::Request)?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), body = %body, "planner returned an error");
            return Err(PlannerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let plan: RawPlan =
            serde_json::from_str(&body).map_err(|e| PlannerError::Malformed(e.to_string()))?;
        tracing::info!(action = %plan.action, "received plan");
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            HttpPlannerConfig::new("http://localhost:8000/").endpoint(),
            "http://localhost:8000/agent"
        );
        assert_eq!(
            HttpPlannerConfig::default().endpoint(),
            "http://127.0.0.1:8000/agent"
        );
    }

    #[test]
    fn request_serializes_to_contract_shape() {
        let request = PlanRequest {
            prompt: "close distracting tabs".into(),
            context: PlanContext {
                tabs: vec![],
                bookmarks: None,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"prompt": "close distracting tabs", "context": {"tabs": []}})
        );
    }
}
