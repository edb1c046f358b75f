//! OCI Monitoring Metrics Exporter
//!
//! Exports OpenTelemetry metrics to the Oracle Cloud Infrastructure Monitoring
//! ingestion API (`PostMetricData`).
//!
//! # Features
//!
//! - Sum and gauge metrics converted into dimensioned time series
//! - Resource, scope and data point attributes flattened into dimensions
//! - Pluggable dimension and metadata extraction strategies
//! - Plugs into the OpenTelemetry SDK as a push metric exporter
//! - Configurable via YAML, environment variables, or programmatic API
//! - Mock client for testing
//!
//! # Example
//!
//! ```no_run
//! use oci_metrics_exporter::{ConfigBuilder, ClientConfig, HttpMonitoringClient, OciMetricsExporter};
//! use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), oci_metrics_exporter::OciError> {
//! let config = ConfigBuilder::new()
//!     .namespace("my_app")
//!     .resource_group("web")
//!     .compartment_id("ocid1.compartment.oc1..example")
//!     .build()?;
//! let client = HttpMonitoringClient::new(&ClientConfig::new(
//!     "https://telemetry-ingestion.us-ashburn-1.oraclecloud.com",
//! ))?;
//!
//! let exporter = OciMetricsExporter::from_config(&config, Arc::new(client))?;
//! let provider = SdkMeterProvider::builder()
//!     .with_reader(PeriodicReader::builder(exporter).build())
//!     .build();
//! # let _ = provider;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod exporter;
pub mod metrics;
pub mod mock;
pub mod monitoring;

// Re-export public API
pub use config::{
    AuthConfig, ClientConfig, ConfigBuilder, ConfigLoader, DimensionsConfig, ExporterConfig,
    InstrumentKind, TemporalityPreference,
};
pub use error::{OciClientError, OciConfigError, OciError, OciExportError};
pub use exporter::{ExportResult, ExtraOptions, OciMetricsExporter, OciMetricsExporterBuilder};
pub use metrics::{
    DescriptionUnitMetadataExtractor, DimensionsExtractor, MetadataExtractor, MetricsConverter,
    MetricsSerializer, MetricsSnapshot, MonitoringMetricsConverter, PrefixedDimensionsExtractor,
};
pub use mock::MockMonitoringClient;
pub use monitoring::{
    BatchAtomicity, HttpMonitoringClient, MetricDataDetails, MonitoringClient,
    PostMetricDataDetails, PostMetricDataResponse,
};

// Initialize tracing subscriber for structured logging
use tracing_subscriber::EnvFilter;

/// Initialize structured logging
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice() {
        init_logging();
        init_logging();
    }
}
