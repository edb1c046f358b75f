//! Ingestion API client
//!
//! The exporter talks to the monitoring service only through
//! [`MonitoringClient`]. [`HttpMonitoringClient`] is a plain JSON-over-HTTP
//! implementation; deployments that need OCI request signing plug in their
//! own client.

use crate::config::{AuthConfig, ClientConfig};
use crate::error::{OciClientError, OciError};
use crate::monitoring::models::{
    PostMetricDataDetails, PostMetricDataResponse, PostMetricDataResponseDetails,
};
use futures::FutureExt;
use futures::future::BoxFuture;
use secrecy::ExposeSecret;
use std::fmt::Debug;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};
use tracing::{debug, info, warn};

/// Path of the `PostMetricData` operation, relative to the telemetry ingestion endpoint
pub const POST_METRIC_DATA_PATH: &str = "/20180401/metrics";

/// Submits metric batches to the ingestion API
pub trait MonitoringClient: Send + Sync + Debug {
    /// Post one batch.
    ///
    /// A non-success HTTP status is returned as a response, not an error;
    /// `Err` is reserved for failures to obtain a response at all.
    fn post_metric_data<'a>(
        &'a self,
        request: &'a PostMetricDataDetails,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<PostMetricDataResponse, OciError>>;
}

/// JSON-over-HTTP client for the ingestion API
#[derive(Debug, Clone)]
pub struct HttpMonitoringClient {
    endpoint_url: String,
    authentication: Option<AuthConfig>,
    client: reqwest::Client,
}

impl HttpMonitoringClient {
    /// Create a new client from validated client configuration
    pub fn new(config: &ClientConfig) -> Result<Self, OciError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| {
                OciError::Client(OciClientError::RequestFailed(format!(
                    "Failed to create HTTP client: {}",
                    e
                )))
            })?;

        let endpoint_url = config.endpoint_url.trim_end_matches('/').to_string();

        info!(
            endpoint = %endpoint_url,
            authenticated = config.authentication.is_some(),
            "Created monitoring ingestion client"
        );

        Ok(Self {
            endpoint_url,
            authentication: config.authentication.clone(),
            client,
        })
    }

    /// Full URL requests are posted to
    pub fn post_url(&self) -> String {
        format!("{}{}", self.endpoint_url, POST_METRIC_DATA_PATH)
    }

    async fn send(
        &self,
        request: &PostMetricDataDetails,
        timeout: Duration,
    ) -> Result<PostMetricDataResponse, OciError> {
        let mut http_request = self
            .client
            .post(self.post_url())
            .timeout(timeout)
            .json(request);

        http_request = self.add_auth_headers(http_request)?;

        let response = http_request.send().await.map_err(|e| {
            OciError::Client(OciClientError::RequestFailed(format!(
                "Failed to post metric data: {}",
                e
            )))
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            OciError::Client(OciClientError::InvalidResponse(format!(
                "Failed to read response body: {}",
                e
            )))
        })?;

        let data = if body.is_empty() {
            PostMetricDataResponseDetails::default()
        } else {
            match serde_json::from_slice::<PostMetricDataResponseDetails>(&body) {
                Ok(details) => details,
                Err(e) => {
                    // Error responses carry {code, message} instead of the details body.
                    debug!(
                        status,
                        error = %e,
                        body = %String::from_utf8_lossy(&body),
                        "Response body is not a PostMetricData result"
                    );
                    PostMetricDataResponseDetails::default()
                }
            }
        };

        if !(200..300).contains(&status) {
            warn!(status, "Ingestion API returned non-success status");
        }

        Ok(PostMetricDataResponse { status, data })
    }

    /// Add authentication headers to HTTP request
    fn add_auth_headers(
        &self,
        mut request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, OciError> {
        if let Some(ref auth) = self.authentication {
            match auth.auth_type.as_str() {
                "api_key" => {
                    let key = auth
                        .credentials
                        .get("key")
                        .or_else(|| auth.credentials.get("api_key"))
                        .ok_or_else(|| {
                            OciError::Client(OciClientError::Authentication(
                                "API key authentication requires 'key' in credentials"
                                    .to_string(),
                            ))
                        })?;
                    let header_name = auth
                        .credentials
                        .get("header_name")
                        .map(|s| s.expose_secret().clone())
                        .unwrap_or_else(|| "X-API-Key".to_string());
                    request = request.header(header_name, key.expose_secret());
                }
                "bearer_token" => {
                    let token = auth.credentials.get("token").ok_or_else(|| {
                        OciError::Client(OciClientError::Authentication(
                            "Bearer token authentication requires 'token' in credentials"
                                .to_string(),
                        ))
                    })?;
                    request = request.bearer_auth(token.expose_secret());
                }
                "basic" => {
                    let username = auth.credentials.get("username").ok_or_else(|| {
                        OciError::Client(OciClientError::Authentication(
                            "Basic authentication requires 'username' in credentials".to_string(),
                        ))
                    })?;
                    let password = auth.credentials.get("password").ok_or_else(|| {
                        OciError::Client(OciClientError::Authentication(
                            "Basic authentication requires 'password' in credentials".to_string(),
                        ))
                    })?;
                    request = request
                        .basic_auth(username.expose_secret(), Some(password.expose_secret()));
                }
                other => {
                    return Err(OciError::Client(OciClientError::Authentication(format!(
                        "Unsupported authentication type: {}",
                        other
                    ))));
                }
            }
        }
        Ok(request)
    }
}

impl MonitoringClient for HttpMonitoringClient {
    fn post_metric_data<'a>(
        &'a self,
        request: &'a PostMetricDataDetails,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<PostMetricDataResponse, OciError>> {
        if Handle::try_current().is_ok() {
            return self.send(request, timeout).boxed();
        }

        // The SDK's periodic reader drives exports from a plain thread; reqwest
        // needs a Tokio reactor, so run the request on a shared background runtime.
        let client = self.clone();
        let request = request.clone();
        async move {
            let runtime = background_runtime()?;
            runtime
                .spawn(async move { client.send(&request, timeout).await })
                .await
                .map_err(|e| {
                    OciError::Client(OciClientError::RequestFailed(format!(
                        "Request task failed: {}",
                        e
                    )))
                })?
        }
        .boxed()
    }
}

fn background_runtime() -> Result<&'static Runtime, OciError> {
    static RUNTIME: OnceLock<Result<Runtime, String>> = OnceLock::new();

    RUNTIME
        .get_or_init(|| {
            debug!("Starting background runtime for ingestion requests");
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("oci-metrics-http")
                .enable_all()
                .build()
                .map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|e| {
            OciError::Client(OciClientError::RequestFailed(format!(
                "Failed to create runtime: {}",
                e
            )))
        })
}
