//! Request and response bodies of the OCI Monitoring `PostMetricData` API
//!
//! Field names follow the REST API's camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dimension key to dimension value.
///
/// Sorted by key, so equal content compares and hashes equal regardless of
/// the order attributes were recorded in.
pub type DimensionMap = BTreeMap<String, String>;

/// Metadata key to metadata value (`description`, `unit`)
pub type MetadataMap = BTreeMap<String, String>;

/// One dimensioned time series and its points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDataDetails {
    /// Metric namespace
    pub namespace: String,
    /// Resource group the metric belongs to
    pub resource_group: String,
    /// Compartment OCID the metric is posted to
    pub compartment_id: String,
    /// Metric name
    pub name: String,
    /// Dimensions identifying the time series
    pub dimensions: DimensionMap,
    /// Optional metadata; omitted from the request when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataMap>,
    /// Points of the time series, in encounter order
    pub datapoints: Vec<Datapoint>,
}

/// A single timestamped value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datapoint {
    /// Observation time
    pub timestamp: DateTime<Utc>,
    /// Observed value
    pub value: f64,
    /// Number of raw observations folded into this point
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

impl Datapoint {
    /// Build a point from nanoseconds since Unix epoch, with `count` fixed at 1
    pub fn from_unix_nanos(time_unix_nano: u64, value: f64) -> Self {
        let nanos = i64::try_from(time_unix_nano).unwrap_or(i64::MAX);
        Self {
            timestamp: DateTime::from_timestamp_nanos(nanos),
            value,
            count: 1,
        }
    }
}

/// How the ingestion API treats a batch containing invalid records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchAtomicity {
    /// All records are accepted or none is
    #[default]
    Atomic,
    /// Valid records are accepted, invalid ones reported individually
    NonAtomic,
}

impl BatchAtomicity {
    /// Wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            BatchAtomicity::Atomic => "ATOMIC",
            BatchAtomicity::NonAtomic => "NON_ATOMIC",
        }
    }
}

impl std::str::FromStr for BatchAtomicity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ATOMIC" => Ok(BatchAtomicity::Atomic),
            "NON_ATOMIC" | "NONATOMIC" => Ok(BatchAtomicity::NonAtomic),
            other => Err(format!("unknown batch atomicity: {}", other)),
        }
    }
}

/// Body of a `PostMetricData` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMetricDataDetails {
    /// Records to ingest
    pub metric_data: Vec<MetricDataDetails>,
    /// Batch atomicity mode
    pub batch_atomicity: BatchAtomicity,
}

/// A record the ingestion API refused
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedMetricRecord {
    /// Reason given by the API
    pub message: String,
    /// The refused record
    pub metric_data: MetricDataDetails,
}

/// Body of a `PostMetricData` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMetricDataResponseDetails {
    /// Number of refused records
    #[serde(default)]
    pub failed_metrics_count: usize,
    /// The refused records
    #[serde(default)]
    pub failed_metrics: Vec<FailedMetricRecord>,
}

/// Status and body of a `PostMetricData` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostMetricDataResponse {
    /// HTTP status code
    pub status: u16,
    /// Parsed response body
    pub data: PostMetricDataResponseDetails,
}

impl PostMetricDataResponse {
    /// A 200 response with no failed records
    pub fn ok() -> Self {
        Self {
            status: 200,
            data: PostMetricDataResponseDetails::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> MetricDataDetails {
        MetricDataDetails {
            namespace: "ns".to_string(),
            resource_group: "rg".to_string(),
            compartment_id: "ocid1.compartment.oc1..x".to_string(),
            name: "requests".to_string(),
            dimensions: [("scope.name".to_string(), "s".to_string())]
                .into_iter()
                .collect(),
            metadata: None,
            datapoints: vec![Datapoint::from_unix_nanos(1_000_000_000, 2.0)],
        }
    }

    #[test]
    fn test_request_json_shape() {
        let request = PostMetricDataDetails {
            metric_data: vec![record()],
            batch_atomicity: BatchAtomicity::NonAtomic,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["batchAtomicity"], "NON_ATOMIC");
        let metric = &value["metricData"][0];
        assert_eq!(metric["resourceGroup"], "rg");
        assert_eq!(metric["compartmentId"], "ocid1.compartment.oc1..x");
        assert_eq!(metric["dimensions"], json!({"scope.name": "s"}));
        assert!(metric.get("metadata").is_none());
        assert_eq!(metric["datapoints"][0]["value"], 2.0);
        assert_eq!(metric["datapoints"][0]["count"], 1);
        assert_eq!(metric["datapoints"][0]["timestamp"], "1970-01-01T00:00:01Z");
    }

    #[test]
    fn test_response_details_parse() {
        let body = json!({
            "failedMetricsCount": 1,
            "failedMetrics": [{"message": "bad dimension", "metricData": record()}]
        });
        let details: PostMetricDataResponseDetails = serde_json::from_value(body).unwrap();
        assert_eq!(details.failed_metrics_count, 1);
        assert_eq!(details.failed_metrics[0].message, "bad dimension");
        assert_eq!(details.failed_metrics[0].metric_data.name, "requests");
    }

    #[test]
    fn test_datapoint_keeps_nanosecond_precision() {
        let dp = Datapoint::from_unix_nanos(456_789_123_456_789_123, 42.0);
        assert_eq!(dp.timestamp.timestamp(), 456_789_123);
        assert_eq!(dp.timestamp.timestamp_subsec_nanos(), 456_789_123);
        assert_eq!(dp.count, 1);
    }

    #[test]
    fn test_batch_atomicity_parse() {
        assert_eq!("atomic".parse::<BatchAtomicity>(), Ok(BatchAtomicity::Atomic));
        assert_eq!(
            "NON_ATOMIC".parse::<BatchAtomicity>(),
            Ok(BatchAtomicity::NonAtomic)
        );
        assert!("sometimes".parse::<BatchAtomicity>().is_err());
        assert_eq!(BatchAtomicity::default().as_str(), "ATOMIC");
    }
}
