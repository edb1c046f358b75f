//! Build a [`MetricsSnapshot`] from the SDK's `ResourceMetrics`
//!
//! `opentelemetry_sdk` 0.31 only exposes collected metrics through borrowing
//! accessors. The exporter receives a `&ResourceMetrics` from the reader, so the
//! data is copied once into the public-field snapshot before conversion.

use crate::metrics::snapshot::*;
use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::Temporality;
use opentelemetry_sdk::metrics::data::{
    self as sdk, AggregatedMetrics, ResourceMetrics, ScopeMetrics as SdkScopeMetrics,
};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::trace;

impl MetricsSnapshot {
    /// Copy one SDK collection result into a snapshot
    pub fn from_resource_metrics(metrics: &ResourceMetrics) -> Self {
        let resource = Resource {
            attributes: metrics
                .resource()
                .iter()
                .map(|(key, value)| KeyValue::new(key.clone(), value.clone()))
                .collect(),
        };

        let scope_metrics: Vec<ScopeBlock> = metrics.scope_metrics().map(scope_block).collect();

        trace!(
            resource_attributes = resource.attributes.len(),
            scopes = scope_metrics.len(),
            "Copied SDK resource metrics into snapshot"
        );

        Self {
            resource_metrics: vec![ResourceBlock {
                resource,
                scope_metrics,
                schema_url: metrics
                    .resource()
                    .schema_url()
                    .map(str::to_string)
                    .unwrap_or_default(),
            }],
        }
    }
}

impl From<&ResourceMetrics> for MetricsSnapshot {
    fn from(metrics: &ResourceMetrics) -> Self {
        MetricsSnapshot::from_resource_metrics(metrics)
    }
}

fn scope_block(sdk_scope: &SdkScopeMetrics) -> ScopeBlock {
    let scope = sdk_scope.scope();
    ScopeBlock {
        scope: InstrumentationScope {
            name: scope.name().to_string(),
            version: scope.version().map(str::to_string),
            schema_url: scope.schema_url().map(str::to_string),
        },
        metrics: sdk_scope
            .metrics()
            .map(|metric| Metric {
                name: metric.name().to_string(),
                description: non_empty(metric.description()),
                unit: non_empty(metric.unit()),
                data: match metric.data() {
                    AggregatedMetrics::F64(data) => metric_data(data),
                    AggregatedMetrics::U64(data) => metric_data(data),
                    AggregatedMetrics::I64(data) => metric_data(data),
                },
            })
            .collect(),
        schema_url: scope.schema_url().map(str::to_string).unwrap_or_default(),
    }
}

fn metric_data<T>(data: &sdk::MetricData<T>) -> MetricData
where
    T: Copy + Into<NumberValue>,
{
    match data {
        sdk::MetricData::Gauge(gauge) => {
            let start = gauge.start_time().map(unix_nanos);
            let time = unix_nanos(gauge.time());
            MetricData::Gauge(Gauge {
                data_points: gauge
                    .data_points()
                    .map(|dp| NumberDataPoint {
                        attributes: dp.attributes().cloned().collect(),
                        start_time_unix_nano: start,
                        time_unix_nano: time,
                        value: dp.value().into(),
                    })
                    .collect(),
            })
        }
        sdk::MetricData::Sum(sum) => {
            let start = Some(unix_nanos(sum.start_time()));
            let time = unix_nanos(sum.time());
            MetricData::Sum(Sum {
                data_points: sum
                    .data_points()
                    .map(|dp| NumberDataPoint {
                        attributes: dp.attributes().cloned().collect(),
                        start_time_unix_nano: start,
                        time_unix_nano: time,
                        value: dp.value().into(),
                    })
                    .collect(),
                temporality: temporality(sum.temporality()),
                is_monotonic: sum.is_monotonic(),
            })
        }
        sdk::MetricData::Histogram(hist) => {
            let start = Some(unix_nanos(hist.start_time()));
            let time = unix_nanos(hist.time());
            MetricData::Histogram(Histogram {
                data_points: hist
                    .data_points()
                    .map(|dp| HistogramDataPoint {
                        attributes: dp.attributes().cloned().collect(),
                        start_time_unix_nano: start,
                        time_unix_nano: time,
                        count: dp.count() as u64,
                        sum: Some(to_f64(dp.sum())),
                        bucket_counts: dp.bucket_counts().collect(),
                        explicit_bounds: dp.bounds().collect(),
                        min: dp.min().map(to_f64),
                        max: dp.max().map(to_f64),
                    })
                    .collect(),
                temporality: temporality(hist.temporality()),
            })
        }
        // Exponential buckets are not representable either; only the summary survives.
        sdk::MetricData::ExponentialHistogram(hist) => {
            let start = Some(unix_nanos(hist.start_time()));
            let time = unix_nanos(hist.time());
            MetricData::Histogram(Histogram {
                data_points: hist
                    .data_points()
                    .map(|dp| HistogramDataPoint {
                        attributes: dp.attributes().cloned().collect(),
                        start_time_unix_nano: start,
                        time_unix_nano: time,
                        count: dp.count() as u64,
                        sum: Some(to_f64(dp.sum())),
                        bucket_counts: vec![],
                        explicit_bounds: vec![],
                        min: dp.min().map(to_f64),
                        max: dp.max().map(to_f64),
                    })
                    .collect(),
                temporality: temporality(hist.temporality()),
            })
        }
    }
}

fn to_f64<T: Into<NumberValue>>(value: T) -> f64 {
    value.into().as_f64()
}

fn temporality(temporality: Temporality) -> AggregationTemporality {
    match temporality {
        Temporality::Cumulative => AggregationTemporality::Cumulative,
        _ => AggregationTemporality::Delta,
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Nanoseconds since Unix epoch; times before the epoch collapse to zero
pub(crate) fn unix_nanos(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
