//! Metrics snapshot data structures with public fields
//!
//! These structures mirror the SDK's `ResourceMetrics` collection result but
//! with public fields, so the converter can walk resource, scope, metric and
//! data point without relying on the SDK's private accessors. A snapshot is
//! built fresh for each export call and treated as read-only afterwards.

use opentelemetry::KeyValue;

/// All metrics collected in one reader cycle, grouped by resource
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    /// Resource blocks in collection order
    pub resource_metrics: Vec<ResourceBlock>,
}

/// Metrics produced by one resource, grouped by instrumentation scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceBlock {
    /// The entity that produced the metrics
    pub resource: Resource,
    /// Scope blocks in collection order
    pub scope_metrics: Vec<ScopeBlock>,
    /// Schema URL for the resource metrics
    pub schema_url: String,
}

/// Resource attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resource {
    /// Resource attributes as key-value pairs
    pub attributes: Vec<KeyValue>,
}

impl Resource {
    /// Create a resource from its attributes
    pub fn new(attributes: impl IntoIterator<Item = KeyValue>) -> Self {
        Self {
            attributes: attributes.into_iter().collect(),
        }
    }
}

/// Metrics recorded by one instrumentation scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeBlock {
    /// Instrumentation scope information
    pub scope: InstrumentationScope,
    /// Metrics collected in this scope
    pub metrics: Vec<Metric>,
    /// Schema URL for the scope metrics
    pub schema_url: String,
}

/// Identity of the library or module that recorded a metric
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrumentationScope {
    /// Name of the instrumentation scope
    pub name: String,
    /// Version of the instrumentation scope
    pub version: Option<String>,
    /// Schema URL of the instrumentation scope
    pub schema_url: Option<String>,
}

impl InstrumentationScope {
    /// Create a scope with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            schema_url: None,
        }
    }

    /// Set the scope version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the scope schema URL
    pub fn with_schema_url(mut self, schema_url: impl Into<String>) -> Self {
        self.schema_url = Some(schema_url.into());
        self
    }
}

/// A named metric and its aggregated data
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    /// Metric name
    pub name: String,
    /// Metric description
    pub description: Option<String>,
    /// Metric unit
    pub unit: Option<String>,
    /// Metric data (sum, gauge, or histogram)
    pub data: MetricData,
}

/// Aggregated metric data
#[derive(Debug, Clone, PartialEq)]
pub enum MetricData {
    /// Sum metric data
    Sum(Sum),
    /// Gauge metric data
    Gauge(Gauge),
    /// Histogram metric data
    Histogram(Histogram),
}

impl MetricData {
    /// Short lowercase name of the data variant, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            MetricData::Sum(_) => "sum",
            MetricData::Gauge(_) => "gauge",
            MetricData::Histogram(_) => "histogram",
        }
    }
}

/// Gauge metric data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gauge {
    /// Data points for the gauge metric
    pub data_points: Vec<NumberDataPoint>,
}

/// Aggregation temporality of a sum or histogram
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AggregationTemporality {
    /// Values are deltas since the previous collection
    #[default]
    Delta,
    /// Values are running totals since the start time
    Cumulative,
}

/// Sum metric data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sum {
    /// Data points for the sum metric
    pub data_points: Vec<NumberDataPoint>,
    /// Aggregation temporality (cumulative or delta)
    pub temporality: AggregationTemporality,
    /// Whether the sum is monotonic
    pub is_monotonic: bool,
}

/// Histogram metric data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    /// Data points for the histogram metric
    pub data_points: Vec<HistogramDataPoint>,
    /// Aggregation temporality (cumulative or delta)
    pub temporality: AggregationTemporality,
}

/// A single numeric observation of a sum or gauge
#[derive(Debug, Clone, PartialEq)]
pub struct NumberDataPoint {
    /// Attributes associated with this data point
    pub attributes: Vec<KeyValue>,
    /// Start time of the data point in nanoseconds since Unix epoch
    pub start_time_unix_nano: Option<u64>,
    /// Time of the data point in nanoseconds since Unix epoch
    pub time_unix_nano: u64,
    /// Value of the data point
    pub value: NumberValue,
}

impl NumberDataPoint {
    /// Create a data point with no start time
    pub fn new(
        attributes: impl IntoIterator<Item = KeyValue>,
        time_unix_nano: u64,
        value: impl Into<NumberValue>,
    ) -> Self {
        Self {
            attributes: attributes.into_iter().collect(),
            start_time_unix_nano: None,
            time_unix_nano,
            value: value.into(),
        }
    }

    /// Set the start time in nanoseconds since Unix epoch
    pub fn with_start_time(mut self, start_time_unix_nano: u64) -> Self {
        self.start_time_unix_nano = Some(start_time_unix_nano);
        self
    }
}

/// Numeric value of a data point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    /// Signed integer value
    AsInt(i64),
    /// Unsigned integer value
    AsUnsigned(u64),
    /// Double (floating-point) value
    AsDouble(f64),
}

impl NumberValue {
    /// The value as a float, as the ingestion API expects
    pub fn as_f64(self) -> f64 {
        match self {
            NumberValue::AsInt(i) => i as f64,
            NumberValue::AsUnsigned(u) => u as f64,
            NumberValue::AsDouble(d) => d,
        }
    }
}

impl From<i64> for NumberValue {
    fn from(value: i64) -> Self {
        NumberValue::AsInt(value)
    }
}

impl From<u64> for NumberValue {
    fn from(value: u64) -> Self {
        NumberValue::AsUnsigned(value)
    }
}

impl From<f64> for NumberValue {
    fn from(value: f64) -> Self {
        NumberValue::AsDouble(value)
    }
}

/// A single histogram observation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistogramDataPoint {
    /// Attributes associated with this data point
    pub attributes: Vec<KeyValue>,
    /// Start time of the data point in nanoseconds since Unix epoch
    pub start_time_unix_nano: Option<u64>,
    /// Time of the data point in nanoseconds since Unix epoch
    pub time_unix_nano: u64,
    /// Count of values in the histogram
    pub count: u64,
    /// Sum of all values in the histogram
    pub sum: Option<f64>,
    /// Count of values in each bucket
    pub bucket_counts: Vec<u64>,
    /// Explicit bounds for histogram buckets
    pub explicit_bounds: Vec<f64>,
    /// Minimum value in the histogram
    pub min: Option<f64>,
    /// Maximum value in the histogram
    pub max: Option<f64>,
}
