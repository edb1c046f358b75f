//! Configuration type definitions
//!
//! Defines all configuration structures for the OCI metrics exporter.

use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::OciConfigError;
use crate::metrics::dimensions::is_valid_dimension_key;
use crate::monitoring::models::BatchAtomicity;

/// Instrument kinds the SDK can ask a temporality for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    /// Synchronous monotonic counter
    Counter,
    /// Synchronous up-down counter
    UpDownCounter,
    /// Synchronous histogram
    Histogram,
    /// Synchronous gauge
    Gauge,
    /// Asynchronous monotonic counter
    ObservableCounter,
    /// Asynchronous up-down counter
    ObservableUpDownCounter,
    /// Asynchronous gauge
    ObservableGauge,
}

impl InstrumentKind {
    /// Every instrument kind
    pub const ALL: [InstrumentKind; 7] = [
        InstrumentKind::Counter,
        InstrumentKind::UpDownCounter,
        InstrumentKind::Histogram,
        InstrumentKind::Gauge,
        InstrumentKind::ObservableCounter,
        InstrumentKind::ObservableUpDownCounter,
        InstrumentKind::ObservableGauge,
    ];
}

/// Preferred aggregation temporality for an instrument kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalityPreference {
    /// Report the change since the last export (what the ingestion API expects)
    #[default]
    Delta,
    /// Report running totals
    Cumulative,
}

/// Dimension naming options
#[derive(Debug, Clone, Deserialize)]
pub struct DimensionsConfig {
    /// Prefix for resource attribute dimensions (default: empty)
    #[serde(default)]
    pub prefix_resource: String,

    /// Prefix for scope dimensions (default: `scope.`)
    #[serde(default = "default_prefix_scope")]
    pub prefix_scope: String,

    /// Emit the scope schema URL as a dimension (default: false)
    #[serde(default)]
    pub include_schema_url: bool,

    /// Turn data point attributes into dimensions (default: true)
    #[serde(default = "default_true")]
    pub include_data_point_attributes: bool,
}

impl Default for DimensionsConfig {
    fn default() -> Self {
        Self {
            prefix_resource: String::new(),
            prefix_scope: default_prefix_scope(),
            include_schema_url: false,
            include_data_point_attributes: true,
        }
    }
}

impl DimensionsConfig {
    /// Validate dimension prefixes
    pub fn validate(&self) -> Result<(), OciConfigError> {
        // An empty resource prefix is allowed; the scope prefix may be empty too.
        for (field, prefix) in [
            ("prefix_resource", &self.prefix_resource),
            ("prefix_scope", &self.prefix_scope),
        ] {
            if !prefix.is_empty() && !is_valid_dimension_key(prefix) {
                return Err(OciConfigError::InvalidDimensionPrefix(format!(
                    "{} must be printable ASCII without spaces, got {:?}",
                    field, prefix
                )));
            }
        }
        Ok(())
    }
}

/// Main configuration structure for the exporter
///
/// # Configuration Sources
///
/// Configuration can be loaded from:
/// - YAML files
/// - Environment variables (with `OCI_MONITORING_*` prefix)
/// - Programmatic API (using `ConfigBuilder`)
///
/// # Default Values
///
/// - `dimensions`: no resource prefix, `scope.` scope prefix
/// - `batch_atomicity`: `ATOMIC`
/// - `temporality`: every instrument kind DELTA
/// - `export_timeout_millis`: `10000`
/// - `shutdown_timeout_millis`: `30000`
/// - `client`: none (the caller supplies a client)
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = oci_metrics_exporter::ConfigBuilder::new()
///     .namespace("my_app")
///     .resource_group("web")
///     .compartment_id("ocid1.compartment.oc1..example")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ExporterConfig {
    /// Metric namespace (required)
    #[serde(default)]
    pub namespace: String,

    /// Resource group (required)
    #[serde(default)]
    pub resource_group: String,

    /// Compartment OCID (required)
    #[serde(default)]
    pub compartment_id: String,

    /// Dimension naming options
    #[serde(default)]
    pub dimensions: DimensionsConfig,

    /// Batch atomicity mode (default: ATOMIC)
    #[serde(default)]
    pub batch_atomicity: BatchAtomicity,

    /// Per-instrument-kind temporality overrides; unlisted kinds use DELTA
    #[serde(default)]
    pub temporality: HashMap<InstrumentKind, TemporalityPreference>,

    /// Timeout for one export call in milliseconds (default: 10000)
    #[serde(default = "default_export_timeout_millis")]
    pub export_timeout_millis: u64,

    /// Timeout for shutdown in milliseconds (default: 30000)
    #[serde(default = "default_shutdown_timeout_millis")]
    pub shutdown_timeout_millis: u64,

    /// Optional HTTP client configuration
    #[serde(default)]
    pub client: Option<ClientConfig>,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            resource_group: String::new(),
            compartment_id: String::new(),
            dimensions: DimensionsConfig::default(),
            batch_atomicity: BatchAtomicity::default(),
            temporality: HashMap::new(),
            export_timeout_millis: default_export_timeout_millis(),
            shutdown_timeout_millis: default_shutdown_timeout_millis(),
            client: None,
        }
    }
}

impl ExporterConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), OciConfigError> {
        for (field, value) in [
            ("namespace", &self.namespace),
            ("resource_group", &self.resource_group),
            ("compartment_id", &self.compartment_id),
        ] {
            if value.trim().is_empty() {
                return Err(OciConfigError::MissingRequiredField(field.to_string()));
            }
        }

        self.dimensions.validate()?;

        if self.export_timeout_millis == 0 {
            return Err(OciConfigError::InvalidTimeout(
                "Export timeout must be greater than 0".to_string(),
            ));
        }

        if self.shutdown_timeout_millis == 0 {
            return Err(OciConfigError::InvalidTimeout(
                "Shutdown timeout must be greater than 0".to_string(),
            ));
        }

        if let Some(ref client) = self.client {
            client.validate()?;
        }

        Ok(())
    }

    /// Temporality preference for `kind`, DELTA unless overridden
    pub fn temporality_for(&self, kind: InstrumentKind) -> TemporalityPreference {
        self.temporality.get(&kind).copied().unwrap_or_default()
    }

    /// Export timeout as a duration
    pub fn export_timeout(&self) -> Duration {
        Duration::from_millis(self.export_timeout_millis)
    }

    /// Shutdown timeout as a duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_millis)
    }
}

/// Configuration for the built-in HTTP ingestion client
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Telemetry ingestion endpoint, e.g. `https://telemetry-ingestion.us-ashburn-1.oraclecloud.com`
    pub endpoint_url: String,

    /// Authentication configuration (optional)
    #[serde(default)]
    pub authentication: Option<AuthConfig>,

    /// TCP connect timeout in seconds (default: 10)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl ClientConfig {
    /// Create a client configuration for an endpoint
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            authentication: None,
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    /// Validate client configuration
    pub fn validate(&self) -> Result<(), OciConfigError> {
        if self.endpoint_url.is_empty() {
            return Err(OciConfigError::MissingRequiredField(
                "client.endpoint_url".to_string(),
            ));
        }

        let url = url::Url::parse(&self.endpoint_url)
            .map_err(|e| OciConfigError::InvalidUrl(format!("{}: {}", self.endpoint_url, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(OciConfigError::InvalidUrl(
                "Endpoint URL must use http:// or https:// scheme".to_string(),
            ));
        }

        if self.connect_timeout_secs == 0 {
            return Err(OciConfigError::InvalidTimeout(
                "Connect timeout must be greater than 0".to_string(),
            ));
        }

        if let Some(ref auth) = self.authentication {
            auth.validate()?;
        }

        Ok(())
    }
}

/// Authentication configuration for the HTTP client
///
/// # Supported Authentication Types
///
/// - **`api_key`**: API key header
///   - Required credentials: `key` (or `api_key`)
///   - Optional credentials: `header_name` (default: `X-API-Key`)
///
/// - **`bearer_token`**: Bearer token authentication
///   - Required credentials: `token`
///
/// - **`basic`**: HTTP Basic authentication
///   - Required credentials: `username`, `password`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Type of authentication (e.g., "api_key", "bearer_token", "basic")
    pub auth_type: String,

    /// Authentication parameters (e.g., token, key, username, password)
    pub credentials: HashMap<String, SecretString>,
}

impl AuthConfig {
    /// Validate authentication configuration
    pub fn validate(&self) -> Result<(), OciConfigError> {
        if self.auth_type.is_empty() {
            return Err(OciConfigError::ValidationFailed(
                "Authentication type cannot be empty".to_string(),
            ));
        }

        match self.auth_type.as_str() {
            "api_key" => {
                if !self.credentials.contains_key("key")
                    && !self.credentials.contains_key("api_key")
                {
                    return Err(OciConfigError::MissingRequiredField(
                        "key or api_key required for api_key".to_string(),
                    ));
                }
            }
            "bearer_token" => {
                if !self.credentials.contains_key("token") {
                    return Err(OciConfigError::MissingRequiredField(
                        "token required for bearer_token".to_string(),
                    ));
                }
            }
            "basic" => {
                if !self.credentials.contains_key("username")
                    || !self.credentials.contains_key("password")
                {
                    return Err(OciConfigError::MissingRequiredField(
                        "username and password required for basic auth".to_string(),
                    ));
                }
            }
            _ => {
                return Err(OciConfigError::ValidationFailed(format!(
                    "Unsupported authentication type: {}",
                    self.auth_type
                )));
            }
        }

        Ok(())
    }
}

/// Builder for creating configurations programmatically
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: ExporterConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            config: ExporterConfig::default(),
        }
    }

    /// Set metric namespace
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Set resource group
    pub fn resource_group(mut self, resource_group: impl Into<String>) -> Self {
        self.config.resource_group = resource_group.into();
        self
    }

    /// Set compartment OCID
    pub fn compartment_id(mut self, compartment_id: impl Into<String>) -> Self {
        self.config.compartment_id = compartment_id.into();
        self
    }

    /// Set the resource dimension prefix
    pub fn prefix_resource(mut self, prefix: impl Into<String>) -> Self {
        self.config.dimensions.prefix_resource = prefix.into();
        self
    }

    /// Set the scope dimension prefix
    pub fn prefix_scope(mut self, prefix: impl Into<String>) -> Self {
        self.config.dimensions.prefix_scope = prefix.into();
        self
    }

    /// Set dimension options
    pub fn dimensions(mut self, dimensions: DimensionsConfig) -> Self {
        self.config.dimensions = dimensions;
        self
    }

    /// Set batch atomicity mode
    pub fn batch_atomicity(mut self, atomicity: BatchAtomicity) -> Self {
        self.config.batch_atomicity = atomicity;
        self
    }

    /// Override the temporality of one instrument kind
    pub fn temporality(mut self, kind: InstrumentKind, preference: TemporalityPreference) -> Self {
        self.config.temporality.insert(kind, preference);
        self
    }

    /// Set export timeout in milliseconds
    pub fn export_timeout_millis(mut self, millis: u64) -> Self {
        self.config.export_timeout_millis = millis;
        self
    }

    /// Set shutdown timeout in milliseconds
    pub fn shutdown_timeout_millis(mut self, millis: u64) -> Self {
        self.config.shutdown_timeout_millis = millis;
        self
    }

    /// Set HTTP client configuration
    pub fn client(mut self, client: ClientConfig) -> Self {
        self.config.client = Some(client);
        self
    }

    /// Build the configuration with validation
    pub fn build(self) -> Result<ExporterConfig, OciConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// Default value functions
fn default_prefix_scope() -> String {
    "scope.".to_string()
}

fn default_true() -> bool {
    true
}

fn default_export_timeout_millis() -> u64 {
    10_000
}

fn default_shutdown_timeout_millis() -> u64 {
    30_000
}

fn default_connect_timeout_secs() -> u64 {
    10
}
