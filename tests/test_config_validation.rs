//! Unit tests for configuration validation

use oci_metrics_exporter::config::{
    AuthConfig, ClientConfig, ConfigBuilder, DimensionsConfig, InstrumentKind,
    TemporalityPreference,
};
use oci_metrics_exporter::error::OciConfigError;
use oci_metrics_exporter::monitoring::BatchAtomicity;
use secrecy::SecretString;
use std::collections::HashMap;
use std::time::Duration;

fn valid_builder() -> ConfigBuilder {
    ConfigBuilder::new()
        .namespace("my_namespace")
        .resource_group("my_resource_group")
        .compartment_id("ocid1.compartment.oc1..aaaa")
}

fn auth(auth_type: &str, credentials: &[(&str, &str)]) -> AuthConfig {
    AuthConfig {
        auth_type: auth_type.to_string(),
        credentials: credentials
            .iter()
            .map(|(k, v)| (k.to_string(), SecretString::new(v.to_string())))
            .collect::<HashMap<_, _>>(),
    }
}

#[test]
fn test_valid_config_passes_validation() {
    let config = valid_builder().build().unwrap();

    assert!(config.validate().is_ok());
    assert_eq!(config.dimensions.prefix_resource, "");
    assert_eq!(config.dimensions.prefix_scope, "scope.");
    assert_eq!(config.batch_atomicity, BatchAtomicity::Atomic);
    assert_eq!(config.export_timeout(), Duration::from_millis(10_000));
    assert_eq!(config.shutdown_timeout(), Duration::from_millis(30_000));
    assert!(config.client.is_none());
}

#[test]
fn test_missing_namespace_fails_validation() {
    let config = ConfigBuilder::new()
        .resource_group("rg")
        .compartment_id("cid")
        .build();

    match config.unwrap_err() {
        OciConfigError::MissingRequiredField(field) => assert_eq!(field, "namespace"),
        other => panic!("Expected MissingRequiredField error, got {:?}", other),
    }
}

#[test]
fn test_blank_compartment_fails_validation() {
    let config = valid_builder().compartment_id("   ").build();

    match config.unwrap_err() {
        OciConfigError::MissingRequiredField(field) => assert_eq!(field, "compartment_id"),
        other => panic!("Expected MissingRequiredField error, got {:?}", other),
    }
}

#[test]
fn test_prefix_with_space_fails_validation() {
    let config = valid_builder().prefix_scope("otel scope.").build();

    assert!(matches!(
        config,
        Err(OciConfigError::InvalidDimensionPrefix(_))
    ));
}

#[test]
fn test_empty_prefixes_are_allowed() {
    let config = valid_builder()
        .dimensions(DimensionsConfig {
            prefix_resource: String::new(),
            prefix_scope: String::new(),
            ..Default::default()
        })
        .build()
        .unwrap();

    assert_eq!(config.dimensions.prefix_scope, "");
    assert!(config.dimensions.include_data_point_attributes);
}

#[test]
fn test_zero_export_timeout_fails_validation() {
    let config = valid_builder().export_timeout_millis(0).build();

    assert!(matches!(config, Err(OciConfigError::InvalidTimeout(_))));
}

#[test]
fn test_zero_shutdown_timeout_fails_validation() {
    let config = valid_builder().shutdown_timeout_millis(0).build();

    assert!(matches!(config, Err(OciConfigError::InvalidTimeout(_))));
}

#[test]
fn test_temporality_overrides() {
    let config = valid_builder()
        .temporality(InstrumentKind::Counter, TemporalityPreference::Cumulative)
        .build()
        .unwrap();

    assert_eq!(
        config.temporality_for(InstrumentKind::Counter),
        TemporalityPreference::Cumulative
    );
    assert_eq!(
        config.temporality_for(InstrumentKind::Histogram),
        TemporalityPreference::Delta
    );
}

#[test]
fn test_client_with_invalid_url_fails_validation() {
    let config = valid_builder()
        .client(ClientConfig::new("not a url"))
        .build();

    assert!(matches!(config, Err(OciConfigError::InvalidUrl(_))));
}

#[test]
fn test_client_with_unsupported_scheme_fails_validation() {
    let config = valid_builder()
        .client(ClientConfig::new("ftp://telemetry.example.com"))
        .build();

    assert!(matches!(config, Err(OciConfigError::InvalidUrl(_))));
}

#[test]
fn test_client_with_bearer_token_passes_validation() {
    let mut client = ClientConfig::new("https://telemetry-ingestion.example.com");
    client.authentication = Some(auth("bearer_token", &[("token", "secret")]));

    let config = valid_builder().client(client).build();
    assert!(config.is_ok());
}

#[test]
fn test_client_with_incomplete_basic_auth_fails_validation() {
    let mut client = ClientConfig::new("https://telemetry-ingestion.example.com");
    client.authentication = Some(auth("basic", &[("username", "user")]));

    let config = valid_builder().client(client).build();
    assert!(config.is_err());
}

#[test]
fn test_client_with_unknown_auth_type_fails_validation() {
    let mut client = ClientConfig::new("https://telemetry-ingestion.example.com");
    client.authentication = Some(auth("kerberos", &[]));

    let config = valid_builder().client(client).build();
    assert!(config.is_err());
}
