//! Mock upstream API for testing.
//!
//! `MockUpstream` answers `get_json` from a table keyed by endpoint. An
//! endpoint with no configured response answers with a 404, like the real
//! API does for an unknown repository or path.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::services::github::{GitHubError, UpstreamApi};

/// Record of a request.
#[derive(Debug, Clone)]
pub struct MockCall {
    /// Endpoint requested (path plus query)
    pub endpoint: String,
    /// Timestamp of the call
    pub timestamp: DateTime<Utc>,
}

impl MockCall {
    fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Configured answer for one endpoint.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Body to return, or `None` to fail with `status`
    pub data: Option<Value>,
    /// Status used when `data` is `None`
    pub status: u16,
    /// Delay before answering
    pub delay: Option<Duration>,
}

impl MockResponse {
    pub fn with_data(data: Value) -> Self {
        Self {
            data: Some(data),
            status: 200,
            delay: None,
        }
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            data: None,
            status,
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn result(&self) -> Result<Value, GitHubError> {
        match &self.data {
            Some(data) => Ok(data.clone()),
            None => Err(GitHubError::Status {
                status: self.status,
                message: "mock failure".to_string(),
            }),
        }
    }
}

#[derive(Debug, Default)]
pub struct MockUpstream {
    responses: Mutex<HashMap<String, MockResponse>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `endpoint` with `data`
    pub fn respond(&self, endpoint: &str, data: Value) {
        self.configure(endpoint, MockResponse::with_data(data));
    }

    pub fn configure(&self, endpoint: &str, response: MockResponse) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(endpoint.to_string(), response);
    }

    /// All requests made so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn was_called(&self, endpoint: &str) -> bool {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|c| c.endpoint == endpoint)
    }
}

#[async_trait]
impl UpstreamApi for MockUpstream {
    async fn get_json(&self, endpoint: &str) -> Result<Value, GitHubError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(MockCall::new(endpoint));

        let response = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(endpoint)
            .cloned()
            .unwrap_or_else(|| MockResponse::with_status(404));

        if let Some(delay) = response.delay {
            tokio::time::sleep(delay).await;
        }
        response.result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_records_calls_and_answers() {
        let mock = MockUpstream::new();
        mock.respond("/repos/o/r", json!({"id": 1}));
        mock.configure("/repos/o/r/branches", MockResponse::with_status(500));

        assert_eq!(mock.get_json("/repos/o/r").await.unwrap()["id"], 1);
        assert!(matches!(
            mock.get_json("/repos/o/r/branches").await,
            Err(GitHubError::Status { status: 500, .. })
        ));
        assert!(matches!(
            mock.get_json("/nope").await,
            Err(GitHubError::Status { status: 404, .. })
        ));

        assert_eq!(mock.call_count(), 3);
        assert!(mock.was_called("/repos/o/r/branches"));
        assert_eq!(mock.calls()[2].endpoint, "/nope");
    }
}
