//! Configuration module
//!
//! Provides configuration management for the exporter including loading from
//! YAML files, environment variables, and programmatic API.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{
    AuthConfig, ClientConfig, ConfigBuilder, DimensionsConfig, ExporterConfig, InstrumentKind,
    TemporalityPreference,
};
