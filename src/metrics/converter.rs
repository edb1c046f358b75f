//! Convert metrics snapshots into ingestion records
//!
//! Walks resource → scope → metric → data point and groups the data points of
//! each metric into one [`MetricDataDetails`] per distinct dimension set.

use crate::config::ExporterConfig;
use crate::metrics::dimensions::{
    DimensionsExtractor, PrefixedDimensionsExtractor, dimension_violations,
};
use crate::metrics::metadata::{DescriptionUnitMetadataExtractor, MetadataExtractor};
use crate::metrics::snapshot::{
    InstrumentationScope, Metric, MetricData, MetricsSnapshot, NumberDataPoint, Resource,
};
use crate::monitoring::models::{Datapoint, DimensionMap, MetricDataDetails};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{trace, warn};

/// Turns a snapshot into a one-pass sequence of ingestion records
pub trait MetricsConverter: Send + Sync + Debug {
    /// Convert `snapshot` lazily, one metric at a time
    fn convert<'a>(
        &'a self,
        snapshot: &'a MetricsSnapshot,
    ) -> Box<dyn Iterator<Item = MetricDataDetails> + 'a>;
}

/// Default converter for the OCI Monitoring ingestion API
#[derive(Debug, Clone)]
pub struct MonitoringMetricsConverter {
    namespace: String,
    resource_group: String,
    compartment_id: String,
    dimensions_extractor: Arc<dyn DimensionsExtractor>,
    metadata_extractor: Arc<dyn MetadataExtractor>,
}

impl MonitoringMetricsConverter {
    /// Create a converter with the default extraction strategies
    pub fn new(
        namespace: impl Into<String>,
        resource_group: impl Into<String>,
        compartment_id: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            resource_group: resource_group.into(),
            compartment_id: compartment_id.into(),
            dimensions_extractor: Arc::new(PrefixedDimensionsExtractor::default()),
            metadata_extractor: Arc::new(DescriptionUnitMetadataExtractor),
        }
    }

    /// Create a converter from exporter configuration
    pub fn from_config(config: &ExporterConfig) -> Self {
        let dimensions = &config.dimensions;
        Self::new(
            config.namespace.clone(),
            config.resource_group.clone(),
            config.compartment_id.clone(),
        )
        .with_dimensions_extractor(
            PrefixedDimensionsExtractor::new(
                dimensions.prefix_resource.clone(),
                dimensions.prefix_scope.clone(),
            )
            .with_schema_url(dimensions.include_schema_url)
            .with_data_point_attributes(dimensions.include_data_point_attributes),
        )
    }

    /// Replace the dimension extraction strategy
    pub fn with_dimensions_extractor(mut self, extractor: impl DimensionsExtractor + 'static) -> Self {
        self.dimensions_extractor = Arc::new(extractor);
        self
    }

    /// Replace the metadata extraction strategy
    pub fn with_metadata_extractor(mut self, extractor: impl MetadataExtractor + 'static) -> Self {
        self.metadata_extractor = Arc::new(extractor);
        self
    }

    /// Metric namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Resource group
    pub fn resource_group(&self) -> &str {
        &self.resource_group
    }

    /// Compartment OCID
    pub fn compartment_id(&self) -> &str {
        &self.compartment_id
    }

    /// Records for one metric, in first-seen dimension set order
    fn convert_metric(
        &self,
        resource: &Resource,
        scope: &InstrumentationScope,
        metric: &Metric,
    ) -> Vec<MetricDataDetails> {
        let data_points: &[NumberDataPoint] = match &metric.data {
            MetricData::Sum(sum) => &sum.data_points,
            MetricData::Gauge(gauge) => &gauge.data_points,
            MetricData::Histogram(_) => {
                warn!(
                    metric.name = %metric.name,
                    metric.description = metric.description.as_deref().unwrap_or_default(),
                    "Ignoring histogram metric data: Not implemented."
                );
                return Vec::new();
            }
        };

        if data_points.is_empty() {
            return Vec::new();
        }

        let metadata = self.metadata_extractor.extract(resource, scope, metric);

        let mut records: Vec<MetricDataDetails> = Vec::new();
        let mut index: HashMap<DimensionMap, usize> = HashMap::new();

        for dp in data_points {
            let dimensions = self.dimensions_extractor.extract(resource, scope, Some(dp));
            let datapoint = Datapoint::from_unix_nanos(dp.time_unix_nano, dp.value.as_f64());

            match index.get(&dimensions) {
                Some(&slot) => records[slot].datapoints.push(datapoint),
                None => {
                    for violation in dimension_violations(&dimensions) {
                        warn!(
                            metric.name = %metric.name,
                            violation = ?violation,
                            "Dimension will be rejected by the ingestion API"
                        );
                    }
                    index.insert(dimensions.clone(), records.len());
                    records.push(MetricDataDetails {
                        namespace: self.namespace.clone(),
                        resource_group: self.resource_group.clone(),
                        compartment_id: self.compartment_id.clone(),
                        name: metric.name.clone(),
                        dimensions,
                        metadata: metadata.clone(),
                        datapoints: vec![datapoint],
                    });
                }
            }
        }

        trace!(
            metric.name = %metric.name,
            kind = metric.data.kind(),
            data_points = data_points.len(),
            records = records.len(),
            "Converted metric"
        );

        records
    }
}

impl MetricsConverter for MonitoringMetricsConverter {
    fn convert<'a>(
        &'a self,
        snapshot: &'a MetricsSnapshot,
    ) -> Box<dyn Iterator<Item = MetricDataDetails> + 'a> {
        Box::new(snapshot.resource_metrics.iter().flat_map(move |rm| {
            rm.scope_metrics.iter().flat_map(move |sm| {
                sm.metrics
                    .iter()
                    .flat_map(move |metric| self.convert_metric(&rm.resource, &sm.scope, metric))
            })
        }))
    }
}
