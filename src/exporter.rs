//! OCI Monitoring metrics exporter
//!
//! Converts each snapshot with the injected [`MetricsConverter`] and posts the
//! records to the ingestion API in a single `PostMetricData` call. The exporter
//! keeps no state between calls: no buffering, no retry, no background tasks.

use crate::config::{ExporterConfig, InstrumentKind, TemporalityPreference};
use crate::error::{OciConfigError, OciError};
use crate::metrics::converter::{MetricsConverter, MonitoringMetricsConverter};
use crate::metrics::snapshot::MetricsSnapshot;
use crate::monitoring::client::MonitoringClient;
use crate::monitoring::models::{BatchAtomicity, MetricDataDetails, PostMetricDataDetails};
use opentelemetry_sdk::error::{OTelSdkError, OTelSdkResult};
use opentelemetry_sdk::metrics::Temporality;
use opentelemetry_sdk::metrics::data::ResourceMetrics;
use opentelemetry_sdk::metrics::exporter::PushMetricExporter;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of one export call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportResult {
    /// The ingestion API answered with HTTP 200
    Success,
    /// The ingestion API answered with any other status
    Failure,
}

/// Caller-supplied options the exporter accepts but does not act on
pub type ExtraOptions = BTreeMap<String, String>;

/// Pushes metrics snapshots to OCI Monitoring
#[derive(Debug, Clone)]
pub struct OciMetricsExporter {
    client: Arc<dyn MonitoringClient>,
    converter: Arc<dyn MetricsConverter>,
    batch_atomicity: BatchAtomicity,
    temporality: HashMap<InstrumentKind, TemporalityPreference>,
    export_timeout: Duration,
    shutdown_timeout: Duration,
}

impl OciMetricsExporter {
    /// Start building an exporter around `client`
    pub fn builder(client: Arc<dyn MonitoringClient>) -> OciMetricsExporterBuilder {
        OciMetricsExporterBuilder::new(client)
    }

    /// Create an exporter from validated configuration, with the default converter
    pub fn from_config(
        config: &ExporterConfig,
        client: Arc<dyn MonitoringClient>,
    ) -> Result<Self, OciError> {
        config.validate()?;

        info!(
            namespace = %config.namespace,
            resource_group = %config.resource_group,
            batch_atomicity = config.batch_atomicity.as_str(),
            "Creating OCI metrics exporter"
        );

        Ok(Self {
            client,
            converter: Arc::new(MonitoringMetricsConverter::from_config(config)),
            batch_atomicity: config.batch_atomicity,
            temporality: config.temporality.clone(),
            export_timeout: config.export_timeout(),
            shutdown_timeout: config.shutdown_timeout(),
        })
    }

    /// Batch atomicity sent with every request
    pub fn batch_atomicity(&self) -> BatchAtomicity {
        self.batch_atomicity
    }

    /// Timeout used when the SDK drives the export
    pub fn export_timeout(&self) -> Duration {
        self.export_timeout
    }

    /// Timeout used when the SDK shuts the exporter down
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Convert `snapshot` and post it in one request.
    ///
    /// Returns [`ExportResult::Success`] iff the API answered 200. Records the
    /// API reports as failed are logged but do not change the result.
    pub async fn export(
        &self,
        snapshot: &MetricsSnapshot,
        timeout: Duration,
    ) -> Result<ExportResult, OciError> {
        let metric_data: Vec<MetricDataDetails> = self.converter.convert(snapshot).collect();
        let record_count = metric_data.len();

        let request = PostMetricDataDetails {
            metric_data,
            batch_atomicity: self.batch_atomicity,
        };

        debug!(
            records = record_count,
            batch_atomicity = self.batch_atomicity.as_str(),
            timeout_ms = timeout.as_millis() as u64,
            "Posting metric data"
        );

        let response = self.client.post_metric_data(&request, timeout).await?;

        if response.data.failed_metrics_count > 0 {
            warn!(
                failed_metrics_count = response.data.failed_metrics_count,
                failed_metrics = ?response.data.failed_metrics,
                "Failed exporting some metrics."
            );
        }

        if response.status == 200 {
            debug!(records = record_count, "Exported metric data");
            Ok(ExportResult::Success)
        } else {
            warn!(
                status = response.status,
                records = record_count,
                "Metric data export failed"
            );
            Ok(ExportResult::Failure)
        }
    }

    /// [`export`](Self::export), logging and ignoring `options`
    pub async fn export_with_options(
        &self,
        snapshot: &MetricsSnapshot,
        timeout: Duration,
        options: &ExtraOptions,
    ) -> Result<ExportResult, OciError> {
        warn_ignored_options(options, "Ignored extra export options.");
        self.export(snapshot, timeout).await
    }

    /// Nothing is buffered, so there is nothing to flush
    pub fn force_flush(&self, _timeout: Duration) -> bool {
        true
    }

    /// No-op; the client's lifecycle belongs to whoever created it
    pub fn shutdown(&self, timeout: Duration) {
        debug!(
            timeout_ms = timeout.as_millis() as u64,
            "Shutting down OCI metrics exporter"
        );
    }

    /// [`shutdown`](Self::shutdown), logging and ignoring `options`
    pub fn shutdown_with_options(&self, timeout: Duration, options: &ExtraOptions) {
        warn_ignored_options(options, "Ignored extra shutdown options.");
        self.shutdown(timeout);
    }

    /// Temporality preferred for `kind`, DELTA unless configured otherwise
    pub fn temporality_for(&self, kind: InstrumentKind) -> Temporality {
        match self.preference(kind) {
            TemporalityPreference::Delta => Temporality::Delta,
            TemporalityPreference::Cumulative => Temporality::Cumulative,
        }
    }

    fn preference(&self, kind: InstrumentKind) -> TemporalityPreference {
        self.temporality.get(&kind).copied().unwrap_or_default()
    }

    /// Collapse per-kind preferences into one of the SDK's exporter-wide modes.
    ///
    /// The SDK only lets counters, observable counters and histograms choose;
    /// up-down counters and gauges are always cumulative there.
    fn sdk_temporality(&self) -> Temporality {
        let delta = |kind| self.preference(kind) == TemporalityPreference::Delta;
        let counter = delta(InstrumentKind::Counter);
        let histogram = delta(InstrumentKind::Histogram);
        let observable_counter = delta(InstrumentKind::ObservableCounter);

        match (counter && histogram, observable_counter) {
            (true, true) => Temporality::Delta,
            (true, false) => Temporality::LowMemory,
            _ => Temporality::Cumulative,
        }
    }
}

fn warn_ignored_options(options: &ExtraOptions, message: &'static str) {
    if !options.is_empty() {
        let keys: Vec<&str> = options.keys().map(String::as_str).collect();
        warn!(options = ?keys, "{}", message);
    }
}

impl PushMetricExporter for OciMetricsExporter {
    fn export(&self, metrics: &ResourceMetrics) -> impl Future<Output = OTelSdkResult> + Send {
        let snapshot = MetricsSnapshot::from_resource_metrics(metrics);
        async move {
            match OciMetricsExporter::export(self, &snapshot, self.export_timeout).await {
                Ok(ExportResult::Success) => Ok(()),
                Ok(ExportResult::Failure) => Err(OTelSdkError::InternalFailure(
                    "OCI Monitoring rejected the metric data".to_string(),
                )),
                Err(e) => Err(OTelSdkError::InternalFailure(e.to_string())),
            }
        }
    }

    fn force_flush(&self) -> OTelSdkResult {
        OciMetricsExporter::force_flush(self, self.export_timeout);
        Ok(())
    }

    fn shutdown_with_timeout(&self, timeout: Duration) -> OTelSdkResult {
        OciMetricsExporter::shutdown(self, timeout);
        Ok(())
    }

    fn temporality(&self) -> Temporality {
        self.sdk_temporality()
    }
}

/// Builder for [`OciMetricsExporter`]
#[derive(Debug)]
pub struct OciMetricsExporterBuilder {
    client: Arc<dyn MonitoringClient>,
    converter: Option<Arc<dyn MetricsConverter>>,
    batch_atomicity: BatchAtomicity,
    temporality: HashMap<InstrumentKind, TemporalityPreference>,
    export_timeout: Duration,
    shutdown_timeout: Duration,
}

impl OciMetricsExporterBuilder {
    fn new(client: Arc<dyn MonitoringClient>) -> Self {
        let defaults = ExporterConfig::default();
        Self {
            client,
            converter: None,
            batch_atomicity: BatchAtomicity::default(),
            temporality: HashMap::new(),
            export_timeout: defaults.export_timeout(),
            shutdown_timeout: defaults.shutdown_timeout(),
        }
    }

    /// Converter used to turn snapshots into records (required)
    pub fn converter(mut self, converter: impl MetricsConverter + 'static) -> Self {
        self.converter = Some(Arc::new(converter));
        self
    }

    /// Share an existing converter
    pub fn shared_converter(mut self, converter: Arc<dyn MetricsConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Batch atomicity mode (default: ATOMIC)
    pub fn batch_atomicity(mut self, atomicity: BatchAtomicity) -> Self {
        self.batch_atomicity = atomicity;
        self
    }

    /// Override the temporality preference of one instrument kind
    pub fn temporality(mut self, kind: InstrumentKind, preference: TemporalityPreference) -> Self {
        self.temporality.insert(kind, preference);
        self
    }

    /// Timeout used when the SDK drives the export
    pub fn export_timeout(mut self, timeout: Duration) -> Self {
        self.export_timeout = timeout;
        self
    }

    /// Timeout used when the SDK shuts the exporter down
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Build the exporter
    pub fn build(self) -> Result<OciMetricsExporter, OciError> {
        let converter = self
            .converter
            .ok_or_else(|| OciConfigError::MissingRequiredField("converter".to_string()))?;

        if self.export_timeout.is_zero() {
            return Err(OciConfigError::InvalidTimeout(
                "Export timeout must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(OciMetricsExporter {
            client: self.client,
            converter,
            batch_atomicity: self.batch_atomicity,
            temporality: self.temporality,
            export_timeout: self.export_timeout,
            shutdown_timeout: self.shutdown_timeout,
        })
    }
}
