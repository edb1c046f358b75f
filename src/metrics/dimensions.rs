//! Dimension extraction
//!
//! Turns resource attributes, instrumentation scope identity and data point
//! attributes into the flat string map the ingestion API uses to tell time
//! series apart.

use crate::metrics::snapshot::{InstrumentationScope, NumberDataPoint, Resource};
use crate::monitoring::models::DimensionMap;
use opentelemetry::{Array, KeyValue, Value};
use std::fmt::Debug;
use tracing::debug;

/// Maximum dimension key length accepted by the ingestion API
pub const DIMENSION_KEY_MAX_LEN: usize = 256;

/// Maximum dimension value length (in characters) accepted by the ingestion API
pub const DIMENSION_VALUE_MAX_LEN: usize = 512;

/// Strategy for deriving the dimensions of one time series
pub trait DimensionsExtractor: Send + Sync + Debug {
    /// Build the dimension map for a data point of a metric recorded by `scope`
    /// on `resource`. `data_point` is `None` when dimensions are wanted for the
    /// metric as a whole.
    fn extract(
        &self,
        resource: &Resource,
        scope: &InstrumentationScope,
        data_point: Option<&NumberDataPoint>,
    ) -> DimensionMap;
}

/// Default extractor: prefixed resource and scope dimensions plus raw data
/// point attributes.
///
/// Groups are merged scope first, then resource, then data point attributes;
/// a later group overwrites keys of an earlier one.
#[derive(Debug, Clone)]
pub struct PrefixedDimensionsExtractor {
    /// Prefix for resource attribute keys (default: empty)
    pub prefix_resource: String,
    /// Prefix for scope keys (default: `scope.`)
    pub prefix_scope: String,
    /// Emit `<prefix_scope>schema_url` when the scope has one (default: false)
    pub include_schema_url: bool,
    /// Merge data point attributes into the dimensions (default: true)
    pub include_data_point_attributes: bool,
}

impl Default for PrefixedDimensionsExtractor {
    fn default() -> Self {
        Self {
            prefix_resource: String::new(),
            prefix_scope: "scope.".to_string(),
            include_schema_url: false,
            include_data_point_attributes: true,
        }
    }
}

impl PrefixedDimensionsExtractor {
    /// Create an extractor with the given prefixes and default flags
    pub fn new(prefix_resource: impl Into<String>, prefix_scope: impl Into<String>) -> Self {
        Self {
            prefix_resource: prefix_resource.into(),
            prefix_scope: prefix_scope.into(),
            ..Self::default()
        }
    }

    /// Toggle the scope schema URL dimension
    pub fn with_schema_url(mut self, include: bool) -> Self {
        self.include_schema_url = include;
        self
    }

    /// Toggle merging of data point attributes
    pub fn with_data_point_attributes(mut self, include: bool) -> Self {
        self.include_data_point_attributes = include;
        self
    }

    /// Scope dimensions: name always, version and schema URL when present
    pub fn scope_dimensions(&self, scope: &InstrumentationScope) -> DimensionMap {
        let mut dimensions = DimensionMap::new();
        dimensions.insert(format!("{}name", self.prefix_scope), scope.name.clone());

        if let Some(version) = scope.version.as_deref().filter(|v| !v.is_empty()) {
            dimensions.insert(format!("{}version", self.prefix_scope), version.to_string());
        }

        if self.include_schema_url {
            if let Some(schema_url) = scope.schema_url.as_deref().filter(|s| !s.is_empty()) {
                dimensions.insert(
                    format!("{}schema_url", self.prefix_scope),
                    schema_url.to_string(),
                );
            }
        }

        dimensions
    }

    /// Resource dimensions: every attribute, prefixed and flattened
    pub fn resource_dimensions(&self, resource: &Resource) -> DimensionMap {
        attribute_dimensions(&self.prefix_resource, &resource.attributes)
    }
}

impl DimensionsExtractor for PrefixedDimensionsExtractor {
    fn extract(
        &self,
        resource: &Resource,
        scope: &InstrumentationScope,
        data_point: Option<&NumberDataPoint>,
    ) -> DimensionMap {
        let mut dimensions = self.scope_dimensions(scope);
        dimensions.extend(self.resource_dimensions(resource));

        if self.include_data_point_attributes {
            if let Some(dp) = data_point {
                dimensions.extend(attribute_dimensions("", &dp.attributes));
            }
        }

        dimensions
    }
}

/// Flatten attributes into dimensions, visiting keys in sorted order.
///
/// Entries with an empty key or an empty flattened value are skipped since the
/// ingestion API rejects them. Duplicate keys resolve to the last occurrence.
pub fn attribute_dimensions(prefix: &str, attributes: &[KeyValue]) -> DimensionMap {
    let mut sorted: Vec<&KeyValue> = attributes.iter().collect();
    // Stable sort keeps the original relative order of duplicate keys.
    sorted.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));

    let mut dimensions = DimensionMap::new();
    for kv in sorted {
        let value = flatten_value(&kv.value);
        if kv.key.as_str().is_empty() || value.is_empty() {
            debug!(
                key = kv.key.as_str(),
                "Skipping attribute with empty key or value"
            );
            continue;
        }
        dimensions.insert(format!("{}{}", prefix, kv.key.as_str()), value);
    }
    dimensions
}

/// Render an attribute value as a dimension value.
///
/// Strings pass through, scalars use their JSON encoding (`true`, `-3`, `3.3`,
/// `0.0`), arrays join their flattened elements with `,`.
pub fn flatten_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.as_str().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::I64(i) => i.to_string(),
        Value::F64(f) => flatten_f64(*f),
        Value::Array(array) => flatten_array(array),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

fn flatten_array(array: &Array) -> String {
    match array {
        Array::Bool(values) => join(values.iter().map(|b| b.to_string())),
        Array::I64(values) => join(values.iter().map(|i| i.to_string())),
        Array::F64(values) => join(values.iter().map(|f| flatten_f64(*f))),
        Array::String(values) => join(values.iter().map(|s| s.as_str().to_string())),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(",")
}

fn flatten_f64(f: f64) -> String {
    // serde_json renders finite floats the way JSON encoders do (`0.0`, not `0`).
    match serde_json::Number::from_f64(f) {
        Some(number) => number.to_string(),
        None => f.to_string(),
    }
}

/// A dimension entry the ingestion API will refuse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimensionViolation {
    /// Key is empty, too long, or contains non-printable ASCII or spaces
    InvalidKey(String),
    /// Value is empty or too long
    InvalidValue {
        /// Key of the offending entry
        key: String,
        /// Length of the value in characters
        len: usize,
    },
}

/// Check a dimension map against the ingestion API limits
pub fn dimension_violations(dimensions: &DimensionMap) -> Vec<DimensionViolation> {
    let mut violations = Vec::new();
    for (key, value) in dimensions {
        if !is_valid_dimension_key(key) {
            violations.push(DimensionViolation::InvalidKey(key.clone()));
        }
        let len = value.chars().count();
        if len == 0 || len > DIMENSION_VALUE_MAX_LEN {
            violations.push(DimensionViolation::InvalidValue {
                key: key.clone(),
                len,
            });
        }
    }
    violations
}

/// Printable ASCII without space, 1..=256 characters
pub fn is_valid_dimension_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= DIMENSION_KEY_MAX_LEN
        && key.bytes().all(|b| b.is_ascii_graphic())
}
