//! Render a snapshot as the JSON records the exporter would post

use crate::error::{OciError, OciExportError};
use crate::metrics::converter::MetricsConverter;
use crate::metrics::snapshot::MetricsSnapshot;
use crate::monitoring::models::MetricDataDetails;
use std::sync::Arc;

/// JSON rendering of converted records, for console output and debugging
#[derive(Debug, Clone)]
pub struct MetricsSerializer {
    converter: Arc<dyn MetricsConverter>,
}

impl MetricsSerializer {
    /// Create a serializer over `converter`
    pub fn new(converter: Arc<dyn MetricsConverter>) -> Self {
        Self { converter }
    }

    /// Serialize every record of `snapshot` as one JSON array
    pub fn serialize(&self, snapshot: &MetricsSnapshot) -> Result<String, OciError> {
        let records: Vec<MetricDataDetails> = self.converter.convert(snapshot).collect();
        serde_json::to_string(&records).map_err(|e| {
            OciError::Export(OciExportError::SerializationError(format!(
                "Failed to serialize metric data: {}",
                e
            )))
        })
    }

    /// Like [`serialize`](Self::serialize) but indented
    pub fn serialize_pretty(&self, snapshot: &MetricsSnapshot) -> Result<String, OciError> {
        let records: Vec<MetricDataDetails> = self.converter.convert(snapshot).collect();
        serde_json::to_string_pretty(&records).map_err(|e| {
            OciError::Export(OciExportError::SerializationError(format!(
                "Failed to serialize metric data: {}",
                e
            )))
        })
    }
}
