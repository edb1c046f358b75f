//! Configuration loader
//!
//! Loads configuration from YAML files, environment variables, or programmatic API.
//! Priority: environment variables > provided config > defaults

use std::env;

use crate::config::types::{ClientConfig, ExporterConfig};
use crate::error::OciConfigError;
use crate::monitoring::models::BatchAtomicity;
use tracing::{debug, info, warn};

/// Prefix of every environment variable the loader reads
pub const ENV_PREFIX: &str = "OCI_MONITORING_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from YAML file
    pub fn from_yaml(path: impl AsRef<std::path::Path>) -> Result<ExporterConfig, OciConfigError> {
        let path = path.as_ref();
        info!(
            config_path = %path.display(),
            "Loading configuration from YAML file"
        );

        let content = std::fs::read_to_string(path).map_err(|e| {
            warn!(
                config_path = %path.display(),
                error = %e,
                "Failed to read configuration file"
            );
            OciConfigError::Io(e)
        })?;

        debug!(
            config_path = %path.display(),
            file_size_bytes = content.len(),
            "Read configuration file"
        );

        let config = Self::from_yaml_str(&content).map_err(|e| {
            warn!(
                config_path = %path.display(),
                error = %e,
                "Failed to load YAML configuration"
            );
            e
        })?;

        info!(
            config_path = %path.display(),
            namespace = %config.namespace,
            resource_group = %config.resource_group,
            batch_atomicity = config.batch_atomicity.as_str(),
            "Configuration loaded and validated successfully"
        );

        Ok(config)
    }

    /// Load configuration from a YAML document
    pub fn from_yaml_str(content: &str) -> Result<ExporterConfig, OciConfigError> {
        let mut config: ExporterConfig = serde_yaml::from_str(content)
            .map_err(|e| OciConfigError::Parse(format!("Failed to parse YAML: {}", e)))?;

        Self::apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<ExporterConfig, OciConfigError> {
        info!("Loading configuration from environment variables");
        Self::load(None)
    }

    /// Load configuration with priority: environment variables > provided config > defaults
    pub fn load(provided: Option<ExporterConfig>) -> Result<ExporterConfig, OciConfigError> {
        if provided.is_some() {
            debug!("Starting from provided configuration");
        } else {
            debug!("Starting from default configuration");
        }

        let mut config = provided.unwrap_or_default();

        Self::apply_env_overrides(&mut config);

        debug!("Applied environment variable overrides");

        config.validate().map_err(|e| {
            warn!(
                error = %e,
                "Configuration validation failed"
            );
            e
        })?;

        info!(
            namespace = %config.namespace,
            resource_group = %config.resource_group,
            batch_atomicity = config.batch_atomicity.as_str(),
            "Configuration loaded and validated successfully"
        );

        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(config: &mut ExporterConfig) {
        if let Some(namespace) = env_var("NAMESPACE") {
            config.namespace = namespace;
        }

        if let Some(resource_group) = env_var("RESOURCE_GROUP") {
            config.resource_group = resource_group;
        }

        if let Some(compartment_id) = env_var("COMPARTMENT_ID") {
            config.compartment_id = compartment_id;
        }

        if let Some(prefix) = env_var("PREFIX_RESOURCE") {
            config.dimensions.prefix_resource = prefix;
        }

        if let Some(prefix) = env_var("PREFIX_SCOPE") {
            config.dimensions.prefix_scope = prefix;
        }

        if let Some(atomicity) = env_var("BATCH_ATOMICITY") {
            match atomicity.parse::<BatchAtomicity>() {
                Ok(val) => config.batch_atomicity = val,
                Err(e) => {
                    warn!(
                        env_var = "OCI_MONITORING_BATCH_ATOMICITY",
                        value = %atomicity,
                        error = %e,
                        "Failed to parse environment variable, keeping previous value"
                    );
                }
            }
        }

        if let Some(timeout) = env_var("EXPORT_TIMEOUT_MILLIS") {
            match timeout.parse::<u64>() {
                Ok(millis) => config.export_timeout_millis = millis,
                Err(e) => {
                    warn!(
                        env_var = "OCI_MONITORING_EXPORT_TIMEOUT_MILLIS",
                        value = %timeout,
                        error = %e,
                        "Failed to parse environment variable, keeping previous value"
                    );
                }
            }
        }

        if let Some(url) = env_var("ENDPOINT_URL") {
            match config.client {
                Some(ref mut client) => client.endpoint_url = url,
                None => config.client = Some(ClientConfig::new(url)),
            }
        }
    }
}

fn env_var(suffix: &str) -> Option<String> {
    let name = format!("{}{}", ENV_PREFIX, suffix);
    let value = env::var(&name).ok()?;
    debug!(
        env_var = %name,
        "Applying environment variable override"
    );
    Some(value)
}
