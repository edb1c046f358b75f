//! Metrics data model and conversion into ingestion records
//!
//! This module provides:
//! - The snapshot shape the exporter consumes, and its conversion from the SDK
//! - Dimension and metadata extraction strategies
//! - The converter that groups data points into ingestion records
//! - A JSON serializer for console output

pub mod converter;
pub mod dimensions;
pub mod metadata;
pub mod sdk;
pub mod serializer;
pub mod snapshot;

pub use converter::{MetricsConverter, MonitoringMetricsConverter};
pub use dimensions::{DimensionsExtractor, PrefixedDimensionsExtractor};
pub use metadata::{DescriptionUnitMetadataExtractor, MetadataExtractor};
pub use serializer::MetricsSerializer;
pub use snapshot::{
    AggregationTemporality, Gauge, Histogram, HistogramDataPoint, InstrumentationScope, Metric,
    MetricData, MetricsSnapshot, NumberDataPoint, NumberValue, Resource, ResourceBlock,
    ScopeBlock, Sum,
};
