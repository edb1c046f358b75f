//! OCI Monitoring ingestion API: wire model and client

pub mod client;
pub mod models;

pub use client::{HttpMonitoringClient, MonitoringClient, POST_METRIC_DATA_PATH};
pub use models::{
    BatchAtomicity, Datapoint, DimensionMap, FailedMetricRecord, MetadataMap, MetricDataDetails,
    PostMetricDataDetails, PostMetricDataResponse, PostMetricDataResponseDetails,
};
