//! Mock client module
//!
//! Provides an in-memory ingestion client for tests and dry runs.

pub mod client;

pub use client::MockMonitoringClient;
