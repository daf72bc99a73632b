//! Telemetry initialization for listsync services.
//!
//! Provides tracing subscriber setup for service binaries and tests, and a
//! Prometheus metrics exporter for standalone services.

pub mod metrics;
pub mod tracing;
