//! Mock ingestion client for testing
//!
//! Records every request it receives and answers with a configurable status
//! and failed-metrics body, or with a transport error. Clones share state, so
//! a test can hand one clone to the exporter and inspect the other.

use crate::error::{OciClientError, OciError};
use crate::monitoring::client::MonitoringClient;
use crate::monitoring::models::{
    FailedMetricRecord, PostMetricDataDetails, PostMetricDataResponse,
    PostMetricDataResponseDetails,
};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

/// Mock client state
#[derive(Debug)]
struct MockClientState {
    /// Requests received, in call order
    requests: Vec<PostMetricDataDetails>,
    /// Timeout passed with each request
    timeouts: Vec<Duration>,
    /// Status returned for every call
    status: u16,
    /// Failed records reported with every call
    failed_metrics: Vec<FailedMetricRecord>,
    /// When set, calls fail with this transport error instead
    error: Option<String>,
}

impl Default for MockClientState {
    fn default() -> Self {
        Self {
            requests: Vec::new(),
            timeouts: Vec::new(),
            status: 200,
            failed_metrics: Vec::new(),
            error: None,
        }
    }
}

/// In-memory [`MonitoringClient`]
#[derive(Debug, Clone, Default)]
pub struct MockMonitoringClient {
    state: Arc<RwLock<MockClientState>>,
}

impl MockMonitoringClient {
    /// Create a mock that answers 200 with no failed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call with `status`
    pub async fn set_status(&self, status: u16) {
        self.state.write().await.status = status;
    }

    /// Report `failed_metrics` in every response
    pub async fn set_failed_metrics(&self, failed_metrics: Vec<FailedMetricRecord>) {
        self.state.write().await.failed_metrics = failed_metrics;
    }

    /// Fail every call with a transport error carrying `message`
    pub async fn set_error(&self, message: impl Into<String>) {
        self.state.write().await.error = Some(message.into());
    }

    /// Requests received so far
    pub async fn requests(&self) -> Vec<PostMetricDataDetails> {
        self.state.read().await.requests.clone()
    }

    /// Timeouts received so far
    pub async fn timeouts(&self) -> Vec<Duration> {
        self.state.read().await.timeouts.clone()
    }

    /// Number of calls received so far, including failed ones
    pub async fn request_count(&self) -> usize {
        self.state.read().await.requests.len()
    }

    /// Forget recorded requests; configured answers are kept
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.requests.clear();
        state.timeouts.clear();
    }

    async fn record(
        &self,
        request: &PostMetricDataDetails,
        timeout: Duration,
    ) -> Result<PostMetricDataResponse, OciError> {
        let mut state = self.state.write().await;
        state.requests.push(request.clone());
        state.timeouts.push(timeout);

        info!(
            records = request.metric_data.len(),
            batch_atomicity = request.batch_atomicity.as_str(),
            "Mock client received metric data"
        );

        if let Some(ref message) = state.error {
            return Err(OciError::Client(OciClientError::RequestFailed(
                message.clone(),
            )));
        }

        Ok(PostMetricDataResponse {
            status: state.status,
            data: PostMetricDataResponseDetails {
                failed_metrics_count: state.failed_metrics.len(),
                failed_metrics: state.failed_metrics.clone(),
            },
        })
    }
}

impl MonitoringClient for MockMonitoringClient {
    fn post_metric_data<'a>(
        &'a self,
        request: &'a PostMetricDataDetails,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<PostMetricDataResponse, OciError>> {
        self.record(request, timeout).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::models::BatchAtomicity;

    fn request() -> PostMetricDataDetails {
        PostMetricDataDetails {
            metric_data: Vec::new(),
            batch_atomicity: BatchAtomicity::Atomic,
        }
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let mock = MockMonitoringClient::new();
        let shared = mock.clone();

        let response = mock
            .post_metric_data(&request(), Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(response, PostMetricDataResponse::ok());
        assert_eq!(shared.request_count().await, 1);
        assert_eq!(shared.timeouts().await, vec![Duration::from_secs(1)]);

        shared.reset().await;
        assert_eq!(mock.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_mock_configured_error() {
        let mock = MockMonitoringClient::new();
        mock.set_error("connection reset").await;

        let result = mock.post_metric_data(&request(), Duration::from_secs(1)).await;
        assert!(matches!(
            result,
            Err(OciError::Client(OciClientError::RequestFailed(ref m))) if m == "connection reset"
        ));
        assert_eq!(mock.request_count().await, 1);
    }
}
