//! Unit tests for OciMetricsExporter

mod common;

use common::CapturedLogs;
use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::data::ResourceMetrics;
use opentelemetry_sdk::metrics::exporter::PushMetricExporter;
use oci_metrics_exporter::error::{OciClientError, OciError};
use oci_metrics_exporter::metrics::{
    Gauge, InstrumentationScope, Metric, MetricData, MetricsSnapshot, MonitoringMetricsConverter,
    NumberDataPoint, Resource, ResourceBlock, ScopeBlock,
};
use oci_metrics_exporter::monitoring::{BatchAtomicity, FailedMetricRecord};
use oci_metrics_exporter::{ExportResult, ExtraOptions, MockMonitoringClient, OciMetricsExporter};
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(3);

fn create_exporter(mock: &MockMonitoringClient, atomicity: BatchAtomicity) -> OciMetricsExporter {
    OciMetricsExporter::builder(Arc::new(mock.clone()))
        .converter(MonitoringMetricsConverter::new(
            "my-namespace",
            "my-resource-group",
            "my-compartment-id",
        ))
        .batch_atomicity(atomicity)
        .build()
        .unwrap()
}

/// Helper function to create a snapshot with one gauge metric
fn create_test_snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        resource_metrics: vec![ResourceBlock {
            resource: Resource::new(vec![KeyValue::new("name", "foobar")]),
            scope_metrics: vec![ScopeBlock {
                scope: InstrumentationScope::new("scope-name"),
                metrics: vec![Metric {
                    name: "my-metric-name".to_string(),
                    description: None,
                    unit: None,
                    data: MetricData::Gauge(Gauge {
                        data_points: vec![NumberDataPoint::new(
                            vec![KeyValue::new("foo", "bar")],
                            456_789_123_456_789_123,
                            42i64,
                        )],
                    }),
                }],
                schema_url: String::new(),
            }],
            schema_url: String::new(),
        }],
    }
}

async fn failed_record(mock: &MockMonitoringClient) -> FailedMetricRecord {
    // Reuse a record the exporter actually sent
    let exporter = create_exporter(mock, BatchAtomicity::Atomic);
    exporter.export(&create_test_snapshot(), TIMEOUT).await.unwrap();
    let record = mock.requests().await[0].metric_data[0].clone();
    mock.reset().await;
    FailedMetricRecord {
        message: "Invalid dimension value".to_string(),
        metric_data: record,
    }
}

#[tokio::test]
async fn test_export_success_on_200() {
    let mock = MockMonitoringClient::new();
    let exporter = create_exporter(&mock, BatchAtomicity::Atomic);

    let result = exporter.export(&create_test_snapshot(), TIMEOUT).await.unwrap();

    assert_eq!(result, ExportResult::Success);
    let requests = mock.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].batch_atomicity, BatchAtomicity::Atomic);
    assert_eq!(requests[0].metric_data.len(), 1);
    assert_eq!(requests[0].metric_data[0].name, "my-metric-name");
    assert_eq!(requests[0].metric_data[0].datapoints[0].value, 42.0);
    assert_eq!(mock.timeouts().await, vec![TIMEOUT]);
}

#[tokio::test]
async fn test_export_failure_on_500() {
    let mock = MockMonitoringClient::new();
    mock.set_status(500).await;
    let exporter = create_exporter(&mock, BatchAtomicity::Atomic);

    let result = exporter.export(&create_test_snapshot(), TIMEOUT).await.unwrap();

    assert_eq!(result, ExportResult::Failure);
}

#[tokio::test]
async fn test_export_failure_on_500_regardless_of_failed_count() {
    let mock = MockMonitoringClient::new();
    let record = failed_record(&mock).await;
    mock.set_status(500).await;
    mock.set_failed_metrics(vec![record]).await;
    let exporter = create_exporter(&mock, BatchAtomicity::NonAtomic);

    let result = exporter.export(&create_test_snapshot(), TIMEOUT).await.unwrap();

    assert_eq!(result, ExportResult::Failure);
}

#[tokio::test]
async fn test_atomic_batch_with_failed_metrics_still_succeeds_on_200() {
    let mock = MockMonitoringClient::new();
    let record = failed_record(&mock).await;
    mock.set_failed_metrics(vec![record]).await;
    let exporter = create_exporter(&mock, BatchAtomicity::Atomic);

    let (logs, _guard) = CapturedLogs::install();
    let result = exporter.export(&create_test_snapshot(), TIMEOUT).await.unwrap();

    assert_eq!(result, ExportResult::Success);
    let warnings = logs.warnings();
    assert!(
        warnings
            .iter()
            .any(|line| line.contains("Failed exporting some metrics.")
                && line.contains("failed_metrics_count=1")
                && line.contains("Invalid dimension value")),
        "missing partial failure warning in {:?}",
        warnings
    );
}

#[tokio::test]
async fn test_no_partial_failure_warning_without_failed_metrics() {
    let mock = MockMonitoringClient::new();
    let exporter = create_exporter(&mock, BatchAtomicity::NonAtomic);

    let (logs, _guard) = CapturedLogs::install();
    exporter.export(&create_test_snapshot(), TIMEOUT).await.unwrap();

    assert!(!logs.contents().contains("Failed exporting some metrics."));
}

#[tokio::test]
async fn test_export_propagates_client_error() {
    let mock = MockMonitoringClient::new();
    mock.set_error("connection refused").await;
    let exporter = create_exporter(&mock, BatchAtomicity::Atomic);

    let result = exporter.export(&create_test_snapshot(), TIMEOUT).await;

    assert!(matches!(
        result,
        Err(OciError::Client(OciClientError::RequestFailed(_)))
    ));
}

#[tokio::test]
async fn test_export_empty_snapshot_still_posts() {
    let mock = MockMonitoringClient::new();
    let exporter = create_exporter(&mock, BatchAtomicity::Atomic);

    let result = exporter
        .export(&MetricsSnapshot::default(), TIMEOUT)
        .await
        .unwrap();

    assert_eq!(result, ExportResult::Success);
    let requests = mock.requests().await;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].metric_data.is_empty());
}

#[tokio::test]
async fn test_export_with_extra_options_logs_and_ignores() {
    let mock = MockMonitoringClient::new();
    let exporter = create_exporter(&mock, BatchAtomicity::Atomic);
    let mut options = ExtraOptions::new();
    options.insert("retries".to_string(), "3".to_string());

    let (logs, _guard) = CapturedLogs::install();
    let result = exporter
        .export_with_options(&create_test_snapshot(), TIMEOUT, &options)
        .await
        .unwrap();

    assert_eq!(result, ExportResult::Success);
    assert_eq!(mock.request_count().await, 1);
    let contents = logs.contents();
    assert!(contents.contains("Ignored extra export options."));
    assert!(contents.contains("retries"));
}

#[tokio::test]
async fn test_force_flush_does_not_contact_api() {
    let mock = MockMonitoringClient::new();
    let exporter = create_exporter(&mock, BatchAtomicity::Atomic);

    assert!(exporter.force_flush(Duration::from_millis(10)));
    assert!(PushMetricExporter::force_flush(&exporter).is_ok());
    assert_eq!(mock.request_count().await, 0);
}

#[tokio::test]
async fn test_shutdown_is_a_no_op() {
    let mock = MockMonitoringClient::new();
    let exporter = create_exporter(&mock, BatchAtomicity::Atomic);
    let mut options = ExtraOptions::new();
    options.insert("graceful".to_string(), "true".to_string());

    let (logs, _guard) = CapturedLogs::install();
    exporter.shutdown(Duration::from_secs(1));
    exporter.shutdown_with_options(Duration::from_secs(1), &options);
    assert!(PushMetricExporter::shutdown(&exporter).is_ok());

    assert_eq!(mock.request_count().await, 0);
    assert!(logs.contents().contains("Ignored extra shutdown options."));
}

#[tokio::test]
async fn test_push_exporter_export_uses_configured_timeout() {
    let mock = MockMonitoringClient::new();
    let exporter = OciMetricsExporter::builder(Arc::new(mock.clone()))
        .converter(MonitoringMetricsConverter::new("ns", "rg", "cid"))
        .export_timeout(Duration::from_millis(1_234))
        .build()
        .unwrap();

    let result = PushMetricExporter::export(&exporter, &ResourceMetrics::default()).await;

    assert!(result.is_ok());
    assert_eq!(mock.timeouts().await, vec![Duration::from_millis(1_234)]);
}

#[tokio::test]
async fn test_push_exporter_export_maps_failure() {
    let mock = MockMonitoringClient::new();
    mock.set_status(400).await;
    let exporter = create_exporter(&mock, BatchAtomicity::Atomic);

    let result = PushMetricExporter::export(&exporter, &ResourceMetrics::default()).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_push_exporter_export_maps_client_error() {
    let mock = MockMonitoringClient::new();
    mock.set_error("dns failure").await;
    let exporter = create_exporter(&mock, BatchAtomicity::Atomic);

    let result = PushMetricExporter::export(&exporter, &ResourceMetrics::default()).await;

    assert!(result.is_err());
}
