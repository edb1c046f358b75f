//! Error types for the OCI metrics exporter
//!
//! Defines all error types used throughout the library with clear error messages
//! and context for debugging.

use thiserror::Error;

/// Main error type for the OCI metrics exporter
#[derive(Error, Debug)]
pub enum OciError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] OciConfigError),

    /// Export/processing errors
    #[error("Export error: {0}")]
    Export(#[from] OciExportError),

    /// Ingestion API client errors
    #[error("Client error: {0}")]
    Client(#[from] OciClientError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum OciConfigError {
    /// Missing required configuration field
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// Dimension prefix contains characters the ingestion API rejects in keys
    #[error("Invalid dimension prefix: {0}")]
    InvalidDimensionPrefix(String),

    /// Invalid URL format
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    /// Invalid timeout value
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Configuration file could not be read
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Export/processing errors
#[derive(Error, Debug)]
pub enum OciExportError {
    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The ingestion API answered with a non-success status
    #[error("Ingestion API returned status {0}")]
    ExportFailed(u16),
}

/// Ingestion API client errors
#[derive(Error, Debug)]
pub enum OciClientError {
    /// The HTTP request could not be sent or timed out
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The response body could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication headers could not be built
    #[error("Authentication error: {0}")]
    Authentication(String),
}

impl From<serde_json::Error> for OciError {
    fn from(err: serde_json::Error) -> Self {
        OciError::Export(OciExportError::SerializationError(err.to_string()))
    }
}

impl From<reqwest::Error> for OciError {
    fn from(err: reqwest::Error) -> Self {
        OciError::Client(OciClientError::RequestFailed(err.to_string()))
    }
}
