//! Metadata extraction

use crate::metrics::snapshot::{InstrumentationScope, Metric, Resource};
use crate::monitoring::models::MetadataMap;
use std::fmt::Debug;

/// Strategy for deriving the metadata attached to a metric's records
pub trait MetadataExtractor: Send + Sync + Debug {
    /// Build the metadata for `metric`, or `None` when there is nothing to send
    fn extract(
        &self,
        resource: &Resource,
        scope: &InstrumentationScope,
        metric: &Metric,
    ) -> Option<MetadataMap>;
}

/// Default extractor: `description` and `unit` when they are non-empty
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptionUnitMetadataExtractor;

impl MetadataExtractor for DescriptionUnitMetadataExtractor {
    fn extract(
        &self,
        _resource: &Resource,
        _scope: &InstrumentationScope,
        metric: &Metric,
    ) -> Option<MetadataMap> {
        let mut metadata = MetadataMap::new();

        if let Some(description) = metric.description.as_deref().filter(|d| !d.is_empty()) {
            metadata.insert("description".to_string(), description.to_string());
        }
        if let Some(unit) = metric.unit.as_deref().filter(|u| !u.is_empty()) {
            metadata.insert("unit".to_string(), unit.to_string());
        }

        if metadata.is_empty() {
            None
        } else {
            Some(metadata)
        }
    }
}
